use crate::models::{Config, StudentId};
use anyhow::Result;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Set while waiting on the ID prompt.
static PROMPTING: AtomicBool = AtomicBool::new(false);

pub fn interrupt_message(prompting: bool) -> &'static str {
    if prompting {
        "❌ Interrupted by user; no participant ID given"
    } else {
        "❌ Interrupted by user"
    }
}

/// Ctrl-C ends the process with a message. History is only written at the
/// end of a run, so an interrupted run leaves it untouched.
pub fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        println!("\n{}", interrupt_message(PROMPTING.load(Ordering::SeqCst)));
        std::process::exit(130);
    })?;
    Ok(())
}

/// Asks until a valid ID is entered. `None` once input is exhausted.
pub fn ask_for_id<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<StudentId>> {
    loop {
        write!(out, "Enter participant ID: ")?;
        out.flush()?;

        let mut line = String::new();
        PROMPTING.store(true, Ordering::SeqCst);
        let read = input.read_line(&mut line);
        PROMPTING.store(false, Ordering::SeqCst);
        if read? == 0 {
            writeln!(out)?;
            return Ok(None);
        }

        match StudentId::parse(&line) {
            Ok(id) => return Ok(Some(id)),
            Err(e) => writeln!(out, "❌ {}. Please try again.", e)?,
        }
    }
}

/// Stored ID if present and valid, otherwise a prompted one that is then
/// written back to the config file.
pub fn resolve_id<R: BufRead, W: Write>(
    config: &mut Config,
    config_file: &str,
    reset: bool,
    input: &mut R,
    out: &mut W,
) -> Result<Option<StudentId>> {
    if !reset && !config.student_id.trim().is_empty() {
        match StudentId::parse(&config.student_id) {
            Ok(id) => {
                writeln!(out, "🔑 Participant ID found: {}", id)?;
                return Ok(Some(id));
            }
            Err(e) => writeln!(out, "⚠️  Stored ID \"{}\" is invalid: {}", config.student_id, e)?,
        }
    }

    let Some(id) = ask_for_id(input, out)? else {
        return Ok(None);
    };

    config.student_id = id.to_string();
    match config.save_to_file(config_file) {
        Ok(()) => writeln!(out, "💾 Participant ID {} saved to {}", id, config_file)?,
        Err(e) => {
            warn!("failed to save {}: {:#}", config_file, e);
            writeln!(out, "⚠️  Could not save settings; ID {} is used for this session only", id)?;
        }
    }
    Ok(Some(id))
}
