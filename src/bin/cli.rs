//! gqlpath 命令行工具
//!
//! 加载 JSON 图文档，对其执行 GQL 图模式匹配

use anyhow::Context;
use clap::{Parser, ValueEnum};
use gqlpath::cli::{CommandResult, PrintMode, Session};
use gqlpath::config::{MatchConfig, SearchScope, TiePolicy};
use gqlpath::graph::Graph;
use gqlpath::import::load_graph_json;
use gqlpath::logging::init_tracing;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Ties {
    IncludeAll,
    Truncate,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scope {
    Global,
    PerEndpoints,
}

#[derive(Parser, Debug)]
#[command(name = "gqlpath")]
#[command(about = "GQL 图模式匹配与路径搜索", version)]
struct Args {
    /// 图文档（JSON）
    #[arg(short, long)]
    graph: Option<PathBuf>,

    /// 匹配配置文件（JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 覆盖最大路径长度
    #[arg(long)]
    max_path_length: Option<usize>,

    /// 覆盖每次匹配的步数上限
    #[arg(long)]
    max_steps: Option<u64>,

    /// SHORTEST k 并列处理
    #[arg(long, value_enum)]
    ties: Option<Ties>,

    /// 搜索前缀计数范围
    #[arg(long, value_enum)]
    scope: Option<Scope>,

    /// 日志过滤表达式（RUST_LOG 优先）
    #[arg(long, default_value = "warn")]
    log: String,

    /// 执行单个模式后退出
    #[arg(short = 'e', long)]
    execute: Option<String>,

    /// 以 JSON 行输出结果
    #[arg(long)]
    json: bool,
}

impl Args {
    fn match_config(&self) -> anyhow::Result<MatchConfig> {
        let mut config = match &self.config {
            Some(path) => MatchConfig::from_json_file(path)
                .with_context(|| format!("无法加载配置文件 {}", path.display()))?,
            None => MatchConfig::default(),
        };
        if let Some(max) = self.max_path_length {
            config.max_path_length = max;
        }
        if let Some(steps) = self.max_steps {
            config.max_steps = Some(steps);
        }
        if let Some(ties) = self.ties {
            config.shortest_ties = match ties {
                Ties::IncludeAll => TiePolicy::IncludeAll,
                Ties::Truncate => TiePolicy::Truncate,
            };
        }
        if let Some(scope) = self.scope {
            config.search_scope = match scope {
                Scope::Global => SearchScope::Global,
                Scope::PerEndpoints => SearchScope::PerEndpoints,
            };
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    let config = args.match_config()?;
    let graph = match &args.graph {
        Some(path) => load_graph_json(path)
            .with_context(|| format!("无法加载图文档 {}", path.display()))?,
        None => Graph::new(),
    };
    info!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        max_path_length = config.max_path_length,
        "graph ready"
    );

    let mode = if args.json {
        PrintMode::Json
    } else {
        PrintMode::Table
    };
    let mut session = Session::new(&graph, config, mode);

    // 单个模式
    if let Some(pattern) = &args.execute {
        let output = session.run_pattern(pattern)?;
        print!("{}", output);
        return Ok(());
    }

    // 逐行读取模式
    let stdin = io::stdin();
    let interactive = stdin.is_terminal() && !args.json;
    if interactive {
        println!("gqlpath {} - 输入 'help' 查看帮助，'quit' 退出", gqlpath::VERSION);
    }

    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        if interactive {
            print!("gqlpath> ");
            stdout.flush()?;
        }

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match session.execute(&line) {
            CommandResult::Continue => {}
            CommandResult::Exit => break,
            CommandResult::Message(msg) => print!("{}", msg),
            CommandResult::Error(msg) => eprintln!("错误: {}", msg),
        }
    }

    Ok(())
}
