// ==========================================
// 供应商资质表导入系统 - 命令行入口
// ==========================================
// 子命令:
// - init-db                 建表
// - import <FILE>           上传并导入（--no-upload 直接读取原文件）
// - config list|get|set     查看/修改导入配置
// ==========================================

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use supplier_import::app::{get_default_db_path, AppState};
use supplier_import::logging;

#[derive(Parser, Debug)]
#[command(name = "supplier-import")]
#[command(about = "导入供应商资质表（供应商去重 + 评分落库）")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// 数据库文件路径（缺省: SUPPLIER_IMPORT_DB_PATH 或用户数据目录）
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 初始化数据库表结构
    InitDb,

    /// 导入供应商资质表
    Import {
        /// 表格文件路径（.xls / .xlsx / .xlsm）
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 上传保存时使用的文件名（缺省取 FILE 的文件名）
        #[arg(long)]
        name: Option<String>,

        /// 不复制到上传目录，直接读取 FILE
        #[arg(long)]
        no_upload: bool,

        /// 以 JSON 输出导入汇总
        #[arg(long)]
        json: bool,
    },

    /// 导入配置
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// 列出全部生效配置
    List,
    /// 读取单个配置
    Get { key: String },
    /// 写入单个配置
    Set { key: String, value: String },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    if let Err(e) = run(cli) {
        eprintln!("导入失败: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    match cli.command {
        Command::InitDb => {
            println!("数据库已初始化: {}", state.db_path);
        }
        Command::Import {
            file,
            name,
            no_upload,
            json,
        } => {
            let (message, report) = if no_upload {
                let report = state.import_api.import_file(&file)?;
                (
                    supplier_import::api::IMPORT_SUCCESS_MESSAGE.to_string(),
                    report,
                )
            } else {
                let original_name = match name {
                    Some(n) => n,
                    None => file
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .with_context(|| format!("无法从路径取得文件名: {}", file.display()))?,
                };
                let response = state.import_api.upload_and_import(&file, &original_name)?;
                (response.message, response.report)
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", message);
                println!(
                    "共 {} 行: 写入 {} / 跳过 {} / 失败 {}（新建供应商 {}）",
                    report.total_rows,
                    report.inserted_rows,
                    report.skipped_rows,
                    report.failed_rows,
                    report.suppliers_created
                );
                if report.has_failures() {
                    for failure in &report.failures {
                        println!(
                            "  第 {} 行 [{}] 税号 {}: {}",
                            failure.row_number,
                            failure.stage,
                            failure.tax_id.as_deref().unwrap_or("-"),
                            failure.reason
                        );
                    }
                }
            }
        }
        Command::Config(cmd) => run_config(&state, cmd)?,
    }

    Ok(())
}

fn run_config(state: &AppState, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::List => {
            let configs = state
                .config
                .list_effective_configs()
                .map_err(|e| anyhow!(e.to_string()))?;
            for (key, value) in configs {
                println!("{} = {}", key, value);
            }
        }
        ConfigCommand::Get { key } => {
            let value = state
                .config
                .list_effective_configs()
                .map_err(|e| anyhow!(e.to_string()))?
                .remove(&key)
                .ok_or_else(|| anyhow!("未知配置键: {}", key))?;
            println!("{}", value);
        }
        ConfigCommand::Set { key, value } => {
            state
                .config
                .set_config_value(&key, &value)
                .map_err(|e| anyhow!(e.to_string()))?;
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}
