//! Binary entrypoint for wifi-card.
//!
//! Parses flags, merges them over the optional config file and delegates to
//! the library crate.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{debug, error, info};

use wifi_card::card::{CardContent, CardOptions, Orientation, Template};
use wifi_card::color::Rgb;
use wifi_card::config::Config;
use wifi_card::credential::{Encryption, WifiCredential};
use wifi_card::export::{self, ExportFormat, Exported};
use wifi_card::qr::QrPayload;
use wifi_card::{logging, provisioning};

#[derive(Debug, Parser)]
#[command(
    name = "wifi-card",
    version,
    about = "Generate printable WiFi access cards with a scan-to-join QR code."
)]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the WIFI: provisioning string.
    Encode {
        #[command(flatten)]
        network: NetworkArgs,
    },
    /// Show the fields of a WIFI: provisioning string.
    Decode {
        /// Provisioning string, e.g. 'WIFI:S:Home;T:WPA;P:secret;;'
        payload: String,
    },
    /// Write the QR code as PNG, or draw it in the terminal.
    Qr {
        #[command(flatten)]
        network: NetworkArgs,
        /// PNG file to write; prints to the terminal when omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Minimum side of the PNG in pixels
        #[arg(long, value_name = "PX")]
        size: Option<u32>,
    },
    /// Render a complete card.
    Card {
        #[command(flatten)]
        network: NetworkArgs,
        #[command(flatten)]
        card: CardArgs,
        /// Output file; defaults to wifi-<ssid>.<format> in the output dir
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// png or svg
        #[arg(long)]
        format: Option<ExportFormat>,
    },
}

#[derive(Debug, Args)]
struct NetworkArgs {
    /// Network name
    #[arg(long)]
    ssid: Option<String>,
    /// Network password; leave empty for open networks
    #[arg(long)]
    password: Option<String>,
    /// WPA, WEP or NONE
    #[arg(long, value_name = "TYPE")]
    encryption: Option<Encryption>,
    /// The network does not broadcast its name
    #[arg(long)]
    hidden: bool,
}

#[derive(Debug, Args)]
struct CardArgs {
    /// business or modern
    #[arg(long)]
    template: Option<Template>,
    /// landscape or portrait
    #[arg(long)]
    orientation: Option<Orientation>,
    /// Primary color, e.g. #3b82f6
    #[arg(long, value_name = "HEX")]
    primary: Option<Rgb>,
    /// Secondary color, e.g. #dbeafe
    #[arg(long, value_name = "HEX")]
    secondary: Option<Rgb>,
    /// Print the password instead of a mask
    #[arg(long)]
    show_password: bool,
    /// Print the network name even for hidden networks
    #[arg(long, conflicts_with = "mask_ssid")]
    show_ssid: bool,
    /// Mask the name of a hidden network
    #[arg(long, requires = "hidden")]
    mask_ssid: bool,
    /// Extra line of text, e.g. "For conference attendees only"
    #[arg(long, value_name = "TEXT")]
    info: Option<String>,
    /// Last day the credentials are valid (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    expires: Option<NaiveDate>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = try_main(cli) {
        error!(error = ?err, "wifi-card exited with error");
        std::process::exit(1);
    }
}

fn try_main(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    debug!(config = ?cli.config, "starting wifi-card");

    match cli.command {
        Commands::Encode { network } => {
            let credential = merge_credential(&config, network)?;
            println!("{}", provisioning::encode(&credential));
        }
        Commands::Decode { payload } => {
            let credential = provisioning::decode(payload.trim())
                .context("failed to decode provisioning string")?;
            println!("ssid:       {}", credential.ssid);
            println!("password:   {}", credential.password);
            println!("encryption: {}", credential.encryption);
            println!("hidden:     {}", credential.hidden);
        }
        Commands::Qr {
            network,
            output,
            size,
        } => {
            let credential = merge_credential(&config, network)?;
            let payload = provisioning::encode(&credential);
            match output {
                Some(path) => {
                    let side = size.unwrap_or(config.output.qr_size);
                    export::write_qr_png(&payload, side, &path)
                        .with_context(|| format!("failed to write QR code to {}", path.display()))?;
                }
                None => {
                    let qr = QrPayload::new(&payload).context("failed to generate QR code")?;
                    println!("{}", qr.to_terminal());
                }
            }
        }
        Commands::Card {
            network,
            card,
            output,
            format,
        } => {
            let credential = merge_credential(&config, network)?;
            let options = merge_card_options(&config, card);
            options
                .validate(Local::now().date_naive())
                .context("invalid card options")?;
            let (path, format) = resolve_output(&config, &credential, output, format);
            info!(
                ssid = %credential.ssid,
                encryption = %credential.encryption,
                hidden = credential.hidden,
                template = %options.template,
                orientation = %options.orientation,
                %format,
                "rendering card"
            );
            let content = CardContent::build(&credential, &options);
            let outcome = export::export_card(&content, &options, format, &path)
                .with_context(|| format!("failed to export card to {}", path.display()))?;
            match outcome {
                Exported::Card => println!("{}", path.display()),
                Exported::QrOnly => println!(
                    "{} (QR code only; no usable font for the full card)",
                    path.display()
                ),
            }
        }
    }

    Ok(())
}

/// Flags win over the config file; `--hidden` can only switch hiding on.
fn merge_credential(config: &Config, args: NetworkArgs) -> Result<WifiCredential> {
    let base = &config.network;
    let credential = WifiCredential {
        ssid: args.ssid.unwrap_or_else(|| base.ssid.clone()),
        password: args.password.unwrap_or_else(|| base.password.clone()),
        encryption: args.encryption.unwrap_or(base.encryption),
        hidden: args.hidden || base.hidden,
    };
    credential
        .validate()
        .context("pass --ssid or set network.ssid in the config file")?;
    Ok(credential)
}

fn merge_card_options(config: &Config, args: CardArgs) -> CardOptions {
    let mut options = config.card.clone();
    if let Some(template) = args.template {
        options.template = template;
    }
    if let Some(orientation) = args.orientation {
        options.orientation = orientation;
    }
    if args.primary.is_some() {
        options.colors.primary = args.primary;
    }
    if args.secondary.is_some() {
        options.colors.secondary = args.secondary;
    }
    options.show_password |= args.show_password;
    if args.show_ssid {
        options.show_ssid = Some(true);
    } else if args.mask_ssid {
        options.show_ssid = Some(false);
    }
    if args.info.is_some() {
        options.additional_info = args.info;
    }
    if args.expires.is_some() {
        options.expires = args.expires;
    }
    options
}

fn resolve_output(
    config: &Config,
    credential: &WifiCredential,
    output: Option<PathBuf>,
    format: Option<ExportFormat>,
) -> (PathBuf, ExportFormat) {
    match output {
        Some(path) => {
            let format = format
                .or_else(|| ExportFormat::from_path(&path))
                .unwrap_or(config.output.format);
            (path, format)
        }
        None => {
            let format = format.unwrap_or(config.output.format);
            let name = export::default_file_name(&credential.ssid, format);
            (config.output.dir.join(name), format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_args(argv: &[&str]) -> (NetworkArgs, CardArgs) {
        let cli = Cli::try_parse_from(argv).expect("parse args");
        match cli.command {
            Commands::Card { network, card, .. } => (network, card),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn mask_ssid_requires_a_hidden_network() {
        let err = Cli::try_parse_from(["wifi-card", "card", "--ssid", "HomeNet", "--mask-ssid"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let (network, card) = card_args(&[
            "wifi-card",
            "card",
            "--ssid",
            "HomeNet",
            "--hidden",
            "--mask-ssid",
        ]);
        let credential = merge_credential(&Config::default(), network).unwrap();
        let options = merge_card_options(&Config::default(), card);
        assert_eq!(options.show_ssid, Some(false));
        assert_eq!(
            CardContent::build(&credential, &options).network,
            wifi_card::card::MASK
        );
    }

    #[test]
    fn single_color_flag_keeps_the_template_palette() {
        let (_, card) = card_args(&[
            "wifi-card",
            "card",
            "--template",
            "modern",
            "--primary",
            "#112233",
        ]);
        let colors = merge_card_options(&Config::default(), card).colors();
        assert_eq!(colors.primary, Rgb([0x11, 0x22, 0x33]));
        assert_eq!(colors.secondary, Rgb::from_hex(0xeef2ff));
    }
}
