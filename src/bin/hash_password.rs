//! Print the Argon2id hash of a password read from stdin.
//!
//! Used to seed credentials by hand:
//! `echo -n 'secret' | hash-password`

use std::io::{BufRead, Write};

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut stderr = std::io::stderr();
    write!(stderr, "What is the password? ")?;
    stderr.flush()?;

    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    let hash = link_shortener::password::hash_password(password)?;
    println!("{hash}");
    Ok(())
}
