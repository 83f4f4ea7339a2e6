//! Produce the masked credential variables for a firmware build.
//!
//! ```text
//! obfuscate-credentials <KEY_HEX> <HOST> <AUTH> [--force]
//! ```
//!
//! Prints `ROOMCTL_*` lines ready to export before `cargo build`.

use anyhow::{Context, Result, bail};
use clap::Parser;

use roomctl::secrets::{self, RemoteCredentials};

#[derive(Parser, Debug)]
#[command(name = "obfuscate-credentials", version, about = "Mask remote store credentials for a firmware build")]
struct Args {
    /// One-byte XOR key in hex, e.g. `3F`
    key_hex: String,

    /// Database host, e.g. `my-db.firebaseio.com`
    host: String,

    /// Database secret or auth token
    auth: String,

    /// Emit the variables even if the credentials look wrong
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let key = secrets::parse_key(&args.key_hex).context("invalid XOR key")?;

    let issues = secrets::validate(&args.host, &args.auth);
    for issue in &issues {
        eprintln!("warning: {issue}");
    }
    if !issues.is_empty() && !args.force {
        bail!("credentials rejected ({} issue(s)); pass --force to emit anyway", issues.len());
    }

    let host_obf = secrets::encode_hex(&secrets::obfuscate(&args.host, key));
    let auth_obf = secrets::encode_hex(&secrets::obfuscate(&args.auth, key));

    // Confirm the firmware side decodes what we emit.
    let key_hex = format!("{key:02X}");
    if issues.is_empty() {
        let decoded = RemoteCredentials::decode(&key_hex, &host_obf, &auth_obf)
            .context("round-trip decode failed")?;
        eprintln!("verified host: {}", decoded.host);
    }

    println!("ROOMCTL_XOR_KEY={key_hex}");
    println!("ROOMCTL_DB_HOST_OBF={host_obf}");
    println!("ROOMCTL_DB_AUTH_OBF={auth_obf}");
    Ok(())
}
