use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use papelada_core::{
    document_info, DocumentPipeline, HttpOcrEngine, LopdfTextExtractor, MediaType,
    OpenAiModelClient, PdfiumRenderer, PipelineConfig, RawDocument, SignalAnalyzer, TextExtractor,
};

#[derive(Parser)]
#[command(name = "ppld", version, about = "Structure Brazilian registry documents into typed JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a document through the full pipeline and print the JSON envelope
    Process {
        path: PathBuf,
        /// Document type hint (CNH, CNPJ, ANTT, CRLV, CONTA_ENERGIA, ...)
        #[arg(long = "type")]
        document_type: Option<String>,
        /// Pretty-print the envelope
        #[arg(long)]
        pretty: bool,
    },
    /// Show document facts and the extraction-strategy verdict without
    /// calling any collaborator
    Inspect { path: PathBuf },
    /// Render a first-page preview PNG
    Preview {
        path: PathBuf,
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,
        #[arg(long, default_value_t = 150)]
        dpi: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Process {
            path,
            document_type,
            pretty,
        } => run_process(&path, document_type.as_deref(), pretty).await,
        Commands::Inspect { path } => run_inspect(&path).await,
        Commands::Preview { path, output, dpi } => run_preview(&path, &output, dpi),
    }
}

fn load_document(path: &Path) -> Result<RawDocument> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let Some(media_type) = MediaType::from_extension(ext) else {
        bail!("unsupported file type: {} (use PDF, PNG or JPEG)", path.display());
    };

    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(RawDocument::new(bytes, media_type))
}

async fn run_process(path: &Path, hint: Option<&str>, pretty: bool) -> Result<()> {
    let config = PipelineConfig::from_env();
    config.validate()?;

    let ocr = HttpOcrEngine::new(&config.ocr).context("failed to build OCR client")?;
    let model = OpenAiModelClient::new(&config.model).context("failed to build model client")?;
    let pipeline = DocumentPipeline::new(config, Box::new(ocr), Box::new(model));

    let document = load_document(path)?;
    let result = pipeline.process(&document, hint).await;

    let rendered = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{rendered}");
    Ok(())
}

async fn run_inspect(path: &Path) -> Result<()> {
    let document = load_document(path)?;

    if document.media_type.is_image() {
        println!("media type: {}", document.media_type.mime());
        println!("size: {} bytes", document.len());
        println!("strategy: use_ocr (image input has no text layer)");
        return Ok(());
    }

    let info = document_info(&document.bytes)?;
    println!("media type: {}", document.media_type.mime());
    println!("pages: {}", info.page_count);
    println!("encrypted: {}", info.encrypted);
    println!("size: {} bytes", info.file_size);

    let pages = LopdfTextExtractor::new().extract_pages(&document).await?;
    let native = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let config = PipelineConfig::from_env();
    let decision = SignalAnalyzer::new(&config.signal).decide(&native);
    println!("native text: {} chars", native.trim().chars().count());
    println!("strategy: {}", serde_json::to_string(&decision)?);
    Ok(())
}

fn run_preview(path: &Path, output: &Path, dpi: u32) -> Result<()> {
    let document = load_document(path)?;
    if document.media_type != MediaType::Pdf {
        bail!("preview rendering expects a PDF input");
    }

    let png = PdfiumRenderer::new()
        .render_preview(&document.bytes, dpi)
        .context("failed to render preview")?;
    std::fs::write(output, &png)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("preview written to {} ({} bytes)", output.display(), png.len());
    Ok(())
}
