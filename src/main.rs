use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use result_desk::app::{App, CandidatePick, TheoryEntry};
use result_desk::models::AssessmentType;
use result_desk::services::GateState;
use result_desk::utils::logging;
use result_desk::Config;

#[derive(Debug, Parser)]
#[command(name = "result-desk")]
#[command(version)]
#[command(about = "Record theory, practical and viva results for an exam batch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML 配置文件
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 发送 OTP 到邮箱
    Login { email: String },
    /// 校验 OTP 并保存会话
    Verify { otp: String },
    /// 清除本地会话
    Logout,
    /// 查看登录状态
    Status,
    /// 拉取批次考生
    Fetch { batch_id: String },
    /// 导出待打分表格
    Export {
        batch_id: String,
        #[arg(long)]
        tab: AssessmentType,
        /// 勾选的考生 ID，逗号分隔
        #[arg(long, value_delimiter = ',', conflicts_with = "all")]
        select: Vec<String>,
        /// 勾选全部考生
        #[arg(long)]
        all: bool,
        /// 输出目录
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// 导入打好分的表格并提交
    Import {
        batch_id: String,
        #[arg(long)]
        tab: AssessmentType,
        file: Option<PathBuf>,
    },
    /// 提交理论成绩
    Theory {
        batch_id: String,
        /// id=percentage,wpm[,startTime]，可重复
        #[arg(long = "entry", required = true)]
        entries: Vec<TheoryEntry>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    logging::init(cli.verbose || config.verbose_logging);

    let app = App::initialize(config)?;

    match cli.command {
        Command::Login { email } => {
            app.login(&email).await?;
            println!("OTP sent to your email!");
        }
        Command::Verify { otp } => {
            app.verify(&otp).await?;
            println!("Login successful!");
        }
        Command::Logout => {
            app.logout()?;
            println!("Logged out");
        }
        Command::Status => match app.status()? {
            GateState::AwaitingEmail => println!("Not logged in"),
            GateState::AwaitingOtp { email } => println!("Waiting for the OTP sent to {}", email),
            GateState::Authenticated => println!("Logged in"),
        },
        Command::Fetch { batch_id } => {
            let state = app.fetch(&batch_id).await?;
            for candidate in &state.data.candidates {
                println!(
                    "{}\t{}\t{}",
                    candidate.id, candidate.enrollment_no, candidate.name
                );
            }
        }
        Command::Export {
            batch_id,
            tab,
            select,
            all,
            out,
        } => {
            let pick = if all {
                CandidatePick::All
            } else {
                CandidatePick::Ids(select)
            };
            let path = app.export(&batch_id, tab, &pick, out.as_deref()).await?;
            println!("{}", path.display());
        }
        Command::Import {
            batch_id,
            tab,
            file,
        } => {
            let count = app.import(&batch_id, tab, file.as_deref()).await?;
            println!("Results uploaded for {} candidates", count);
        }
        Command::Theory { batch_id, entries } => {
            let count = app.theory(&batch_id, &entries).await?;
            println!("Results updated successfully ({} candidates)", count);
        }
    }

    Ok(())
}
