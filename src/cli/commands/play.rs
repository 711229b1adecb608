//! CLI command for playing a conversation in the terminal
//!
//! Drives a [`DialogPlayer`] at a fixed frame rate, printing the typewriter
//! reveal as it happens and prompting on stdin for choices and advances.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use console::style;
use serde::Deserialize;

use crate::actions::{ActionHandler, Completion};
use crate::formats::read_graph_file;
use crate::runtime::{DialogPlayer, PlaybackEvent, PlayerConfig};

const FRAME_SECONDS: f32 = 1.0 / 30.0;

/// Demo waitable handler: completes after a payload-specified number of
/// seconds. Payload: `{"seconds": 3.0}` (defaults to 3 when empty).
#[derive(Debug, Default)]
pub struct CountdownHandler;

#[derive(Deserialize)]
struct CountdownPayload {
    seconds: f32,
}

impl ActionHandler for CountdownHandler {
    fn can_handle(&self, action_id: &str) -> bool {
        action_id == "Countdown"
    }

    fn handle(&mut self, _action_id: &str, payload: &str) -> anyhow::Result<Completion> {
        let seconds = if payload.trim().is_empty() {
            3.0
        } else {
            serde_json::from_str::<CountdownPayload>(payload)?.seconds
        };
        Ok(Completion::after_seconds(seconds))
    }
}

pub fn execute(source: &Path, autoplay: bool, typing_speed: f32) -> anyhow::Result<()> {
    let graph = read_graph_file(source)?;

    let config = PlayerConfig {
        typing_speed,
        autoplay,
        ..PlayerConfig::default()
    };
    let mut player = DialogPlayer::new(config);

    // Demo action wiring: a print binding plus the countdown handler.
    player.actions_mut().global_mut().bind("Print", |payload| {
        println!("{}", style(format!("[action] {payload}")).dim());
        Ok(())
    });
    player
        .actions_mut()
        .global_mut()
        .add_handler(CountdownHandler);

    let events: Arc<Mutex<Vec<PlaybackEvent>>> = Arc::default();
    {
        let events = Arc::clone(&events);
        player.subscribe(move |event| {
            if let Ok(mut queue) = events.lock() {
                queue.push(event.clone());
            }
        });
    }

    player.start(graph);

    let mut printed_chars = 0usize;
    while player.is_active() {
        player.tick(FRAME_SECONDS);

        for event in drain(&events) {
            match event {
                PlaybackEvent::LineShown { speaker, .. } => {
                    println!();
                    if !speaker.is_empty() {
                        print!("{} ", style(format!("{speaker}:")).cyan().bold());
                    }
                    printed_chars = 0;
                }
                PlaybackEvent::ChoicePicked { answer, .. } => {
                    println!("{}", style(format!("> {answer}")).green());
                }
                _ => {}
            }
        }

        // Incremental typewriter output.
        let revealed = player.revealed_text();
        let chars: Vec<char> = revealed.chars().collect();
        if chars.len() > printed_chars {
            let fresh: String = chars[printed_chars..].iter().collect();
            print!("{fresh}");
            io::stdout().flush()?;
            printed_chars = chars.len();
        }

        if player.is_typing() || player.is_resolving() {
            thread::sleep(Duration::from_secs_f32(FRAME_SECONDS));
            continue;
        }

        if !player.is_active() {
            break;
        }

        if player.is_awaiting_choice() {
            println!();
            let answers = player.current_choices();
            for (index, answer) in answers.iter().enumerate() {
                println!("  {} {answer}", style(format!("{}.", index + 1)).green());
            }
            let picked = prompt_index(answers.len())?;
            player.select_choice(picked);
            continue;
        }

        if player.autoplay() {
            thread::sleep(Duration::from_secs_f32(FRAME_SECONDS));
            continue;
        }

        prompt_enter()?;
        player.advance();
    }

    // A selection that ends the conversation leaves its event undrained.
    for event in drain(&events) {
        if let PlaybackEvent::ChoicePicked { answer, .. } = event {
            println!("{}", style(format!("> {answer}")).green());
        }
    }
    println!("\n{}", style("conversation ended").dim());

    Ok(())
}

fn drain(events: &Arc<Mutex<Vec<PlaybackEvent>>>) -> Vec<PlaybackEvent> {
    events.lock().map(|mut queue| queue.split_off(0)).unwrap_or_default()
}

fn prompt_enter() -> anyhow::Result<()> {
    print!(" {}", style("[enter]").dim());
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

fn prompt_index(count: usize) -> anyhow::Result<usize> {
    loop {
        print!("{} ", style(">").green());
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        if let Ok(picked) = line.trim().parse::<usize>()
            && picked >= 1
            && picked <= count
        {
            return Ok(picked - 1);
        }
        println!("{}", style(format!("pick 1-{count}")).dim());
    }
}
