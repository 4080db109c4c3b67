use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process;
use tpmextend::tpm::config::{DEFAULT_DEVICE_PATH, TPM_CMD_SIZE_MAX, TPM_RSP_SIZE_MAX};
use tpmextend::{FrameLimits, TpmConfig, TpmContext, TpmDigest, TpmError, TpmPcrValue};

/// Extend and read TPM 1.2 PCRs through the TPM character device
#[derive(Parser, Debug)]
#[command(name = "tpmextend", version, about)]
struct Cli {
    /// TPM device node
    #[arg(long, env = "TPMEXTEND_DEVICE", default_value = DEFAULT_DEVICE_PATH)]
    device: PathBuf,

    /// Largest command frame, header included
    #[arg(long, default_value_t = TPM_CMD_SIZE_MAX)]
    command_max: usize,

    /// Largest response frame, header included
    #[arg(long, default_value_t = TPM_RSP_SIZE_MAX)]
    response_max: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extend a PCR with a SHA-1 sized digest and print the new value
    Extend {
        pcr: u32,
        /// 20-byte digest as 40 hex characters
        digest: String,
        /// Do not ask the TPM for the resulting PCR value
        #[arg(long)]
        quiet: bool,
    },
    /// Print the current value of a PCR
    Read { pcr: u32 },
}

fn run(cli: Cli) -> Result<()> {
    let config = TpmConfig {
        device_path: cli.device,
        limits: FrameLimits::new(cli.command_max, cli.response_max)
            .context("invalid frame size limits")?,
    };
    info!("using TPM device {}", config.device_path.display());
    let mut ctx = TpmContext::open(&config);

    match cli.command {
        Command::Extend { pcr, digest, quiet } => {
            let digest: TpmDigest = digest.parse().context("invalid digest")?;
            if quiet {
                ctx.pcr_extend(pcr, &digest, None)
                    .with_context(|| format!("could not extend PCR {}", pcr))?;
            } else {
                let mut value = TpmPcrValue::default();
                let n = ctx
                    .pcr_extend(pcr, &digest, Some(&mut value))
                    .with_context(|| format!("could not extend PCR {}", pcr))?;
                println!("{}", hex::encode(&value.as_bytes()[..n]));
            }
        }
        Command::Read { pcr } => {
            let mut value = TpmPcrValue::default();
            let n = ctx
                .pcr_read(pcr, &mut value)
                .with_context(|| format!("could not read PCR {}", pcr))?;
            println!("{}", hex::encode(&value.as_bytes()[..n]));
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("{:#}", err);
        // exit with the TPM status byte when the failure came from the TPM layer
        let code = match err.downcast_ref::<TpmError>() {
            Some(tpm_err) => (tpm_err.code() & 0xFF).max(1) as i32,
            None => 1,
        };
        process::exit(code);
    }
}
