fn main() -> anyhow::Result<()> {
    dialograph::cli::run_cli()
}
