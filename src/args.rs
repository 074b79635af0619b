use clap::Parser;
use std::path::PathBuf;

/// wirekit-demo - 通过依赖注入容器装配的令牌认证演示
#[derive(Parser, Debug)]
#[command(name = "wirekit-demo")]
#[command(about = "按名称装配 redis / authModel / authController 并驱动认证流程")]
pub struct Args {
    /// 子命令
    #[command(subcommand)]
    pub command: Command,

    /// 配置文件路径（默认 ~/.config/wirekit/config.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 覆盖配置文件中的日志级别
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// 以JSON输出
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub enum Command {
    /// 签发令牌
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// 校验令牌
    Check {
        #[arg(long)]
        token: String,
    },
    /// 在同一进程内签发并校验令牌
    Session {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// 检查装配并输出依赖图与统计信息
    Graph,
}
