use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use parley_cli::{ParleyCli, default_config, logging, registry};
use parley_engine::Server;

fn main() -> Result<()> {
    let cli = ParleyCli::parse();
    logging::init(cli.log_level);

    let config = cli.config.clone().unwrap_or_else(default_config);
    let server = Server::load(&config, &registry())
        .with_context(|| format!("failed to load {}", config.display()))?;
    server.bot(&cli.bot)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut conversation = None;

    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" => {}
            ":quit" => break,
            ":new" => {
                conversation = None;
                writeln!(stdout, "(new conversation)")?;
            }
            ":state" => match conversation {
                Some(id) => write!(stdout, "{}", server.conversation(id)?.store().tree())?,
                None => writeln!(stdout, "(no conversation yet)")?,
            },
            input => {
                let answer = server.speak(input, &cli.user, conversation, &cli.bot)?;
                conversation = Some(answer.conversation);
                writeln!(stdout, "{}", answer.text)?;
            }
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}
