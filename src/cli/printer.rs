//! 结果打印器
//!
//! 提供表格、垂直和 JSON 格式的匹配结果输出

use crate::error::Result;
use crate::matcher::{MatchResult, MatchStats};
use prettytable::{format, row, Cell, Row, Table};

/// 打印模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    /// 表格模式
    Table,
    /// 垂直模式 (\G)
    Vertical,
    /// 每行一个 JSON 对象
    Json,
}

/// 结果打印器
pub struct Printer {
    mode: PrintMode,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(PrintMode::Table)
    }
}

impl Printer {
    pub fn new(mode: PrintMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PrintMode {
        self.mode
    }

    /// 设置打印模式
    pub fn set_mode(&mut self, mode: PrintMode) {
        self.mode = mode;
    }

    /// 打印匹配结果
    pub fn print_results(&self, results: &[MatchResult], execution_time_ms: u64) -> Result<String> {
        if self.mode == PrintMode::Json {
            return format_json(results);
        }
        if results.is_empty() {
            return Ok(format!("Empty set ({} ms)\n", execution_time_ms));
        }

        let (columns, rows) = tabulate(results);
        let output = match self.mode {
            PrintMode::Vertical => self.format_vertical(&columns, &rows),
            _ => self.format_table(&columns, &rows),
        };

        Ok(format!(
            "{}\n{} row(s) in set ({} ms)\n",
            output,
            rows.len(),
            execution_time_ms
        ))
    }

    /// 表格格式
    fn format_table(&self, columns: &[String], rows: &[Vec<String>]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        let header: Vec<Cell> = columns.iter().map(|c| Cell::new(c)).collect();
        table.set_titles(Row::new(header));

        for row_data in rows {
            let cells: Vec<Cell> = row_data.iter().map(|v| Cell::new(v)).collect();
            table.add_row(Row::new(cells));
        }

        table.to_string()
    }

    /// 垂直格式
    fn format_vertical(&self, columns: &[String], rows: &[Vec<String>]) -> String {
        let max_col_width = columns.iter().map(|c| c.len()).max().unwrap_or(0);
        let mut output = String::new();

        for (i, row_data) in rows.iter().enumerate() {
            output.push_str(&format!(
                "*************************** {}. row ***************************\n",
                i + 1
            ));

            for (j, col) in columns.iter().enumerate() {
                let value = row_data.get(j).map(|s| s.as_str()).unwrap_or("");
                output.push_str(&format!("{:>width$}: {}\n", col, value, width = max_col_width));
            }
        }

        output
    }

    /// 打印搜索统计
    pub fn print_stats(&self, stats: &MatchStats, truncated: bool) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(row!["Counter", "Value"]);
        table.add_row(row!["Starts Tried", stats.starts_tried.to_string()]);
        table.add_row(row!["Edges Expanded", stats.edges_expanded.to_string()]);
        table.add_row(row!["Branches Pruned", stats.branches_pruned.to_string()]);
        table.add_row(row!["Results", stats.results_yielded.to_string()]);
        table.add_row(row!["Truncated", truncated.to_string()]);
        table.to_string()
    }

    /// 打印帮助信息
    pub fn print_help() -> String {
        r#"
═══════════════════════════════════════════════════════════════
                   gqlpath 模式匹配帮助
═══════════════════════════════════════════════════════════════

每行输入一个图模式（可省略 MATCH 关键字）:
  MATCH (a:Person)-[e:KNOWS]->(b)
  MATCH ALL SHORTEST (a)-[]->+(b) WHERE a.name = 'Alice'
  MATCH ANY 3 TRAIL (a)(()-[e]->()){2,4}(b)
  MATCH p = SHORTEST 2 GROUPS (a:City)-[:ROAD]-*(b:City)
  MATCH DIFFERENT EDGES (a)-[e1]->(b), (b)-[e2]->(c)

路径模式: WALK | TRAIL | SIMPLE | ACYCLIC
搜索前缀: ALL | ANY [k] | ANY SHORTEST | ALL SHORTEST
          | SHORTEST k | SHORTEST k GROUPS
量词:     * + ? {n} {m,n} {m,}

控制台命令:
  help, h, ?     显示帮助
  quit, exit, q  退出程序
  stats          显示上一次匹配的搜索统计

提示: 在模式末尾加 \G 可垂直显示结果
      未指定 --max-steps 时每次匹配最多展开 1000000 条边，
      超出后结果被截断

═══════════════════════════════════════════════════════════════
"#
        .to_string()
    }
}

/// 列为所有结果中出现过的变量（按首次出现顺序），最后一列为匹配路径
fn tabulate(results: &[MatchResult]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut columns: Vec<String> = Vec::new();
    for result in results {
        for name in result.bindings.keys() {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }

    let rows = results
        .iter()
        .map(|result| {
            let mut row: Vec<String> = columns
                .iter()
                .map(|name| result.get(name).map(|b| b.to_string()).unwrap_or_default())
                .collect();
            let paths: Vec<String> = result.paths.iter().map(|p| p.to_string()).collect();
            row.push(paths.join(", "));
            row
        })
        .collect();

    columns.push("path".to_string());
    (columns, rows)
}

fn format_json(results: &[MatchResult]) -> Result<String> {
    let mut output = String::new();
    for result in results {
        output.push_str(&serde_json::to_string(result)?);
        output.push('\n');
    }
    Ok(output)
}

/// 检查输入是否以 \G 结尾（垂直显示）
pub fn check_vertical_display(query: &str) -> (String, bool) {
    let trimmed = query.trim();
    if trimmed.ends_with("\\G") || trimmed.ends_with("\\g") {
        let clean_query = trimmed[..trimmed.len() - 2].trim().to_string();
        (clean_query, true)
    } else {
        (trimmed.to_string(), false)
    }
}
