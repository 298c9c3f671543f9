//! Command-line interface and REPL
//!
//! The REPL is the gateway's stand-in for a pointer/touch surface: it
//! injects synthetic press/move/release and touch events into the router,
//! so every control surface can be driven end to end from a terminal.

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use once_cell::sync::Lazy;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;
use std::time::Duration;

use crate::control::{PadButton, SliderChannel, Vec2};
use crate::router::Router;
use crate::state::{ConnectionStatus, ControllerKind, SensorLevel};

static COMMANDS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("power", "toggle the emergency stop (power on/off)"),
        ("controller <pad|joystick|sliders>", "select the control surface"),
        ("press <x> <y>", "joystick press at viewport coordinates"),
        ("move <x> <y>", "joystick motion while dragging"),
        ("release", "joystick release"),
        ("slider <drive|steer|rotate> <0..100>", "set one slider channel"),
        ("center", "center all sliders"),
        ("pad <direction>", "press a pad button (forward, rotate-left, ...)"),
        ("pad release", "release the held pad button"),
        ("swipe <x0> <y0> <x1> <y1> [ms]", "synthetic swipe gesture"),
        ("hold <x> <y>", "touch and hold until the long-press fires"),
        ("status [--json]", "vehicle snapshot"),
        ("drivers", "list registered drivers"),
        ("help", "this help"),
        ("quit", "exit the gateway"),
    ]
});

/// Run the interactive REPL until the operator quits.
pub async fn run_repl(router: Arc<Router>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!(
        "{}",
        "QuadBot gateway REPL - type 'help' for commands".bold()
    );

    loop {
        match rl.readline("quadbot> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if line == "quit" || line == "exit" {
                    break;
                }

                if let Err(e) = dispatch(&router, line).await {
                    println!("{} {e:#}", "error:".red().bold());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

async fn dispatch(router: &Arc<Router>, line: &str) -> Result<()> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["help"] => {
            for (cmd, desc) in COMMANDS.iter() {
                println!("  {:<42} {}", cmd.cyan(), desc);
            }
        }

        ["power"] => {
            let on = router.toggle_power().await;
            if on {
                println!("power {}", "ON".green().bold());
            } else {
                println!("power {}", "OFF".red().bold());
            }
        }

        ["controller", kind] => {
            let kind: ControllerKind = kind
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            router.switch_controller(kind);
            println!("controller: {kind}");
        }

        ["press", x, y] => {
            router.joystick_press(parse_point(x, y)?);
            print_stick(router);
        }
        ["move", x, y] => {
            router.joystick_motion(parse_point(x, y)?);
            print_stick(router);
        }
        ["release"] => {
            router.joystick_release();
            println!("joystick released");
        }

        ["slider", channel, value] => {
            let channel = parse_channel(channel)?;
            let value: f64 = value
                .parse()
                .with_context(|| format!("invalid slider value: {value}"))?;
            router.slider_input(channel, value);
            println!("slider {channel} = {}", router.slider_value(channel));
        }
        ["center"] => {
            router.sliders_reset();
            println!("sliders centered");
        }

        ["pad", "release"] => {
            router.pad_release();
            println!("pad released");
        }
        ["pad", direction] => {
            let direction = direction
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            router.pad_press(PadButton::from_direction(direction));
            println!("pad press: {direction}");
        }

        ["swipe", x0, y0, x1, y1, rest @ ..] => {
            let start = parse_point(x0, y0)?;
            let end = parse_point(x1, y1)?;
            let ms: u64 = match rest {
                [] => 100,
                [ms] => ms
                    .parse()
                    .with_context(|| format!("invalid duration: {ms}"))?,
                _ => bail!("usage: swipe <x0> <y0> <x1> <y1> [ms]"),
            };
            router.touch_start(start, 1);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            router.touch_end(end);
            println!("swipe injected ({ms} ms)");
        }

        ["hold", x, y] => {
            let position = parse_point(x, y)?;
            router.touch_start(position, 1);
            // Past the long-press hold time; the timer fires on its own
            tokio::time::sleep(Duration::from_millis(600)).await;
            router.touch_end(position);
            println!("hold injected");
        }

        ["status", rest @ ..] => {
            let snapshot = router.snapshot().await;
            match rest {
                ["--json"] => println!("{}", serde_json::to_string_pretty(&snapshot)?),
                [] => print_status(router, &snapshot).await,
                _ => bail!("usage: status [--json]"),
            }
        }

        ["drivers"] => {
            for name in router.list_drivers().await {
                println!("  {name}");
            }
        }

        _ => bail!("unknown command: {line} (try 'help')"),
    }
    Ok(())
}

fn parse_point(x: &str, y: &str) -> Result<Vec2> {
    let x: f64 = x.parse().with_context(|| format!("invalid x: {x}"))?;
    let y: f64 = y.parse().with_context(|| format!("invalid y: {y}"))?;
    Ok(Vec2::new(x, y))
}

fn parse_channel(name: &str) -> Result<SliderChannel> {
    match name {
        "drive" => Ok(SliderChannel::Drive),
        "steer" => Ok(SliderChannel::Steer),
        "rotate" => Ok(SliderChannel::Rotate),
        other => bail!("unknown slider channel: {other}"),
    }
}

fn print_stick(router: &Arc<Router>) {
    let offset = router.joystick_offset();
    if router.is_joystick_dragging() {
        println!("stick offset: ({:.1}, {:.1})", offset.x, offset.y);
    } else {
        println!("stick idle");
    }
}

async fn print_status(router: &Arc<Router>, snapshot: &crate::state::VehicleSnapshot) {
    let link = match snapshot.link {
        ConnectionStatus::Connected => snapshot.link.to_string().green(),
        ConnectionStatus::Connecting => snapshot.link.to_string().yellow(),
        ConnectionStatus::Disconnected => snapshot.link.to_string().red(),
    };
    let power = if snapshot.power_on {
        "ON".green()
    } else {
        "OFF".red()
    };

    println!("{} {}", "vehicle:".bold(), snapshot.vehicle);
    println!("{} {power}   {} {link}", "power:".bold(), "link:".bold());
    println!("{} {}", "controller:".bold(), snapshot.controller);
    match snapshot.last_action {
        Some(action) => println!("{} {action}", "last action:".bold()),
        None => println!("{} -", "last action:".bold()),
    }

    let sensors = snapshot.sensors;
    println!(
        "{} battery {}  gas {}  signal {}",
        "sensors:".bold(),
        colorize_level(format!("{}%", sensors.battery), sensors.battery_level()),
        colorize_level(format!("{} ppm", sensors.gas_ppm), sensors.gas_level()),
        colorize_level(format!("{}%", sensors.signal), sensors.signal_level()),
    );

    for name in router.list_drivers().await {
        if let Some(driver) = router.get_driver(&name).await {
            println!("  driver {name}: {}", driver.connection_status());
        }
    }
}

fn colorize_level(text: String, level: SensorLevel) -> colored::ColoredString {
    match level {
        SensorLevel::Normal => text.normal(),
        SensorLevel::Warning => text.yellow(),
        SensorLevel::Critical => text.red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("12.5", "-3").unwrap(), Vec2::new(12.5, -3.0));
        assert!(parse_point("twelve", "0").is_err());
    }

    #[test]
    fn test_parse_channel() {
        assert_eq!(parse_channel("drive").unwrap(), SliderChannel::Drive);
        assert_eq!(parse_channel("rotate").unwrap(), SliderChannel::Rotate);
        assert!(parse_channel("throttle").is_err());
    }

    #[test]
    fn test_help_table_is_well_formed() {
        assert!(COMMANDS.iter().any(|(cmd, _)| cmd.starts_with("swipe")));
        for (cmd, desc) in COMMANDS.iter() {
            assert!(!cmd.is_empty());
            assert!(!desc.is_empty());
        }
    }
}
