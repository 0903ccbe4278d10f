use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use memmap2::Mmap;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use shardx_core::audit::{audit, ShardStatus};
use shardx_core::manifest::ShardManifest;
use shardx_core::{join_after_decode, split_for_encode, CodecConfig, RsCodec};

#[derive(Parser)]
#[command(name = "shardx", version, about = "Reed-Solomon file sharding")]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(clap::Args, Clone, Copy)]
struct ShardCounts {
    #[arg(long, env = "SHARDX_DATA_SHARDS", default_value_t = 4)]
    data_shards: usize,
    #[arg(long, env = "SHARDX_PARITY_SHARDS", default_value_t = 2)]
    parity_shards: usize,
}

impl ShardCounts {
    fn config(self) -> Result<CodecConfig> {
        Ok(CodecConfig::new(self.data_shards, self.parity_shards)?)
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Split a file into data + parity shards: <file>.0 .. <file>.N-1
    Encode {
        input: PathBuf,
        #[command(flatten)]
        counts: ShardCounts,
        /// Directory for shard files (default: next to the input)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Skip writing <file>.manifest.json
        #[arg(long, default_value_t = false)]
        no_manifest: bool,
    },
    /// Check the shard files next to a manifest and report recoverability
    Verify { manifest: PathBuf },
    /// Print the coding matrix
    Matrix {
        #[command(flatten)]
        counts: ShardCounts,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(&cli.log_level);
    match cli.cmd {
        Cmd::Encode { input, counts, output, no_manifest } => {
            encode(&input, counts.config()?, output.as_deref(), !no_manifest)?
        }
        Cmd::Verify { manifest } => verify(&manifest)?,
        Cmd::Matrix { counts } => print_matrix(counts.config()?)?,
    }
    Ok(())
}

/// Respects `RUST_LOG` if set, otherwise uses `level`. Logs go to stderr.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn shard_path(dir: &Path, name: &str, index: usize) -> PathBuf {
    dir.join(format!("{name}.{index}"))
}

fn manifest_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.manifest.json"))
}

fn parent_or_cwd(p: &Path) -> &Path {
    match p.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    }
}

fn encode(input: &Path, cfg: CodecConfig, output: Option<&Path>, write_manifest: bool) -> Result<()> {
    let name = input
        .file_name()
        .ok_or_else(|| anyhow!("not a file path: {}", input.display()))?
        .to_string_lossy()
        .to_string();
    let f = File::open(input).with_context(|| format!("cannot read input file: {}", input.display()))?;
    let len = f.metadata()?.len() as usize;
    // mapping a zero-length file fails on some platforms
    let mmap = if len > 0 {
        Some(unsafe { Mmap::map(&f) }.with_context(|| format!("mmap {}", input.display()))?)
    } else {
        None
    };
    let bytes: &[u8] = mmap.as_deref().unwrap_or(&[]);

    let data = split_for_encode(bytes, cfg.data_shards)?;
    let rs = RsCodec::from_config(cfg)?;
    let parity = rs.encode_parity(&data)?;
    let mut shards = data;
    shards.extend(parity);
    debug!(file = %name, len, shard_size = shards[0].len(), "encoded");

    let dir = output.unwrap_or_else(|| parent_or_cwd(input));
    fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
    for (i, shard) in shards.iter().enumerate() {
        let p = shard_path(dir, &name, i);
        fs::write(&p, shard).with_context(|| format!("write {}", p.display()))?;
        println!("wrote {}", p.display());
    }
    if write_manifest {
        let mf = ShardManifest::build(&name, len as u64, cfg, &shards)?;
        let p = manifest_path(dir, &name);
        fs::write(&p, mf.to_json()?).with_context(|| format!("write {}", p.display()))?;
        println!("wrote {}", p.display());
    }
    Ok(())
}

fn verify(manifest: &Path) -> Result<()> {
    let text = fs::read_to_string(manifest).with_context(|| format!("read {}", manifest.display()))?;
    let mf = ShardManifest::from_json(&text).with_context(|| format!("parse {}", manifest.display()))?;
    let dir = parent_or_cwd(manifest);
    let total = mf.config.total_shards();

    let mut found: BTreeMap<usize, Vec<u8>> = BTreeMap::new();
    for i in 0..total {
        let p = shard_path(dir, &mf.file_name, i);
        match fs::read(&p) {
            Ok(buf) => {
                found.insert(i, buf);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %p.display(), "shard missing")
            }
            Err(e) => return Err(e).with_context(|| format!("read {}", p.display())),
        }
    }

    let (report, intact) = audit(&mf, found);
    for (i, st) in report.statuses.iter().enumerate() {
        let label = match st {
            ShardStatus::Ok => "OK",
            ShardStatus::Corrupt => "CORRUPT",
            ShardStatus::Missing => "MISSING",
        };
        println!("shard {i}: {label}");
    }
    println!("Shards OK: {}/{} (need {})", report.shards_ok, total, mf.config.data_shards);
    println!("Merkle: {}", if report.merkle_ok { "OK" } else { "MISMATCH" });
    println!("Recoverable: {}", if report.recoverable { "YES" } else { "NO" });
    if !report.recoverable {
        bail!("only {} of {} required shards are intact", report.shards_ok, mf.config.data_shards);
    }

    // Rebuild in memory and compare the declared length with the manifest.
    let rs = RsCodec::from_config(mf.config)?;
    let all = rs.decode_missing(&intact, mf.shard_size)?;
    let file = join_after_decode(&all[..mf.config.data_shards])?;
    if file.len() as u64 != mf.file_size {
        bail!("reconstructed {} bytes, manifest records {}", file.len(), mf.file_size);
    }
    println!("Reconstruction: OK ({} bytes)", file.len());
    Ok(())
}

fn print_matrix(cfg: CodecConfig) -> Result<()> {
    let rs = RsCodec::from_config(cfg)?;
    let data_shards = rs.config().data_shards;
    for (r, row) in rs.matrix().to_rows().iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|b| format!("{b:02x}")).collect();
        let kind = if r < data_shards { "data" } else { "parity" };
        println!("{r:>3} {kind:<6} {}", cells.join(" "));
    }
    Ok(())
}
