use boardgen::{BoardConfig, generate_board, preview};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Генератор игровой доски: граница, озёра, города, майлпосты, реки
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (без него берутся параметры по умолчанию)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Сид генератора; перекрывает сид из конфигурации
    #[arg(short, long)]
    seed: Option<u64>,

    /// Путь для сохранения доски в JSON
    #[arg(short, long, default_value = "board.json")]
    output: PathBuf,

    /// Путь для PNG-превью (не сохраняется, если не задан)
    #[arg(short, long)]
    preview: Option<PathBuf>,
}

fn main() -> boardgen::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "загрузка конфигурации");
            BoardConfig::from_toml_file(path)?
        }
        None => BoardConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    tracing::info!(
        width = config.width,
        height = config.height,
        seed = ?config.seed,
        "генерация доски"
    );
    let board = generate_board(&config);

    fs::write(&cli.output, serde_json::to_string_pretty(&board)?)?;
    tracing::info!(path = %cli.output.display(), "доска сохранена");

    if let Some(path) = &cli.preview {
        preview::save_board_png(&board, path)?;
    }
    Ok(())
}
