use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "rentsweep",
    version,
    about = "交互式关闭 SPL Token 账户并回收租金"
)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径（默认查找 rentsweep.toml 或 config/rentsweep.toml）"
    )]
    pub config: Option<PathBuf>,
}
