//! 控制台命令处理
//!
//! 每行输入要么是控制台命令（help、quit、stats），要么是一个图模式

use std::time::Instant;

use tracing::info;

use crate::cli::printer::{check_vertical_display, PrintMode, Printer};
use crate::config::MatchConfig;
use crate::error::Result;
use crate::graph::Graph;
use crate::matcher::{Bindings, MatchResult, MatchStats, PathMatcher};
use crate::query::parse;

/// 控制台命令执行结果
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// 继续运行
    Continue,
    /// 退出程序
    Exit,
    /// 显示消息
    Message(String),
    /// 错误
    Error(String),
}

/// 控制台默认的每次匹配步数上限（配置未指定时生效）
pub const CONSOLE_MAX_STEPS: u64 = 1_000_000;

/// 交互会话：持有图、匹配配置和上一次匹配的统计
pub struct Session<'g> {
    graph: &'g Graph,
    config: MatchConfig,
    printer: Printer,
    last_stats: Option<(MatchStats, bool)>,
}

impl<'g> Session<'g> {
    /// 控制台会一次取完所有结果，未设置步数上限时使用 `CONSOLE_MAX_STEPS`
    pub fn new(graph: &'g Graph, mut config: MatchConfig, mode: PrintMode) -> Self {
        config.max_steps.get_or_insert(CONSOLE_MAX_STEPS);
        Self {
            graph,
            config,
            printer: Printer::new(mode),
            last_stats: None,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// 解析并执行一行输入
    pub fn execute(&mut self, input: &str) -> CommandResult {
        let input = input.trim();
        if input.is_empty() {
            return CommandResult::Continue;
        }

        match input.to_lowercase().as_str() {
            "help" | "h" | "?" => CommandResult::Message(Printer::print_help()),
            "quit" | "exit" | "q" => CommandResult::Exit,
            "stats" => match &self.last_stats {
                Some((stats, truncated)) => {
                    CommandResult::Message(self.printer.print_stats(stats, *truncated))
                }
                None => CommandResult::Error("尚未执行任何匹配".to_string()),
            },
            _ => match self.run_pattern(input) {
                Ok(output) => CommandResult::Message(output),
                Err(e) => CommandResult::Error(e.to_string()),
            },
        }
    }

    /// 匹配一个图模式并格式化结果
    pub fn run_pattern(&mut self, text: &str) -> Result<String> {
        let (text, vertical) = check_vertical_display(text);
        let (results, stats, truncated, elapsed) = self.collect(&text)?;
        self.last_stats = Some((stats, truncated));

        if truncated {
            info!(
                edges_expanded = stats.edges_expanded,
                results = results.len(),
                "search truncated by configured limits"
            );
        }

        let mode = self.printer.mode();
        if vertical && mode == PrintMode::Table {
            self.printer.set_mode(PrintMode::Vertical);
        }
        let output = self.printer.print_results(&results, elapsed);
        self.printer.set_mode(mode);
        let mut output = output?;
        if truncated && self.printer.mode() != PrintMode::Json {
            output.push_str(&format!(
                "结果不完整：搜索在 {} 步 / 路径长度 {} 处截断\n",
                stats.edges_expanded, self.config.max_path_length
            ));
        }
        Ok(output)
    }

    fn collect(&self, text: &str) -> Result<(Vec<MatchResult>, MatchStats, bool, u64)> {
        let start = Instant::now();
        let pattern = parse(text)?;
        let snapshot = self.graph.snapshot();
        let matcher = PathMatcher::with_config(&snapshot, self.config.clone());

        let mut iter = matcher.match_pattern(&pattern, Bindings::new())?;
        let results: Vec<MatchResult> = iter.by_ref().collect();
        Ok((
            results,
            iter.stats(),
            iter.is_truncated(),
            start.elapsed().as_millis() as u64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{label_set, Properties};

    fn graph() -> Graph {
        let graph = Graph::new();
        let a = graph.add_vertex(label_set(["Person"]));
        let b = graph.add_vertex(label_set(["Person"]));
        let c = graph.add_vertex(label_set(["City"]));
        graph
            .add_edge(a, b, label_set(["KNOWS"]), Properties::new())
            .unwrap();
        graph
            .add_edge(b, c, label_set(["LIVES_IN"]), Properties::new())
            .unwrap();
        graph
    }

    #[test]
    fn test_console_commands() {
        let graph = graph();
        let mut session = Session::new(&graph, MatchConfig::default(), PrintMode::Table);
        assert_eq!(session.execute("   "), CommandResult::Continue);
        assert_eq!(session.execute("QUIT"), CommandResult::Exit);
        assert!(matches!(session.execute("help"), CommandResult::Message(_)));
        assert!(matches!(session.execute("stats"), CommandResult::Error(_)));
    }

    #[test]
    fn test_run_pattern() {
        let graph = graph();
        let mut session = Session::new(&graph, MatchConfig::default(), PrintMode::Table);
        let output = session
            .run_pattern("MATCH (a:Person)-[:KNOWS]->(b)-[:LIVES_IN]->(c:City)")
            .unwrap();
        assert!(output.contains("1 row(s) in set"));
        assert!(output.contains("(v1)-[e1]-(v2)-[e2]-(v3)"));

        match session.execute("stats") {
            CommandResult::Message(stats) => assert!(stats.contains("Results")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_vertical_suffix() {
        let graph = graph();
        let mut session = Session::new(&graph, MatchConfig::default(), PrintMode::Table);
        let output = session.run_pattern("(a:City) \\G").unwrap();
        assert!(output.contains("1. row"));
        // 模式只在本次生效
        let output = session.run_pattern("(a:City)").unwrap();
        assert!(!output.contains("1. row"));
    }

    #[test]
    fn test_console_step_cap() {
        let graph = graph();
        let session = Session::new(&graph, MatchConfig::default(), PrintMode::Table);
        assert_eq!(session.config().max_steps, Some(CONSOLE_MAX_STEPS));

        let config = MatchConfig {
            max_steps: Some(1),
            ..MatchConfig::default()
        };
        let mut session = Session::new(&graph, config, PrintMode::Table);
        assert_eq!(session.config().max_steps, Some(1));
        let output = session.run_pattern("(a)-[]->*(b)").unwrap();
        assert!(output.contains("结果不完整"));
        match session.execute("stats") {
            CommandResult::Message(stats) => assert!(stats.contains("true")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_errors_are_reported() {
        let graph = graph();
        let mut session = Session::new(&graph, MatchConfig::default(), PrintMode::Table);
        match session.execute("MATCH (a:Planet)") {
            CommandResult::Error(msg) => assert!(msg.contains("Planet")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(session.execute("MATCH (a"), CommandResult::Error(_)));
        assert!(matches!(
            session.execute("MATCH (a)-[]->{3,1}(b)"),
            CommandResult::Error(_)
        ));
    }
}
