//! 命令行交互模块
//!
//! 控制台命令解析与匹配结果打印

mod commands;
mod printer;

pub use commands::{CommandResult, Session, CONSOLE_MAX_STEPS};
pub use printer::{check_vertical_display, PrintMode, Printer};
