use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    config_dir: Option<String>,
    media_dir: Option<String>,
    admin_secret: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;

    if let Some(dir) = &args.config_dir {
        // config.rs resolves everything through this override.
        unsafe { std::env::set_var("SONGDECK_CONFIG_DIR", dir) };
    }

    let media_dir = match args.media_dir {
        Some(dir) => PathBuf::from(dir),
        None => songdeck::config::media_root()?,
    };
    let admin_secret = args
        .admin_secret
        .or_else(|| std::env::var("SONGDECK_ADMIN_SECRET").ok());

    songdeck::app::run(songdeck::config::Settings {
        media_dir,
        admin_secret,
    })
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--config-dir" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--config-dir requires a path");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("--config-dir cannot be empty");
                }
                out.config_dir = Some(value.trim().to_string());
            }
            "--media-dir" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--media-dir requires a path");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("--media-dir cannot be empty");
                }
                out.media_dir = Some(value.trim().to_string());
            }
            "--admin-secret" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--admin-secret requires a value");
                };
                out.admin_secret = Some(value.to_string());
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("SongDeck");
    println!("  --config-dir path     State directory (default ~/.config/songdeck)");
    println!("  --media-dir path      Audio file directory (default <config>/media)");
    println!("  --admin-secret value  Unlock secret for catalog edits");
}
