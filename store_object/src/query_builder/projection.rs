//! Parsing of projection strings such as `*, courses(title,slug)` or `count(*), sum(price)`

use crate::query_builder::aggregation::AggregateFunction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionItem {
    /// `*`
    All,
    Column(String),
    /// `count(*)` has no column
    Aggregate {
        function: AggregateFunction,
        column: Option<String>,
    },
    /// `related(inner projection)`
    Embedded { table: String, projection: String },
}

pub fn parse_projection(projection: &str) -> Vec<ProjectionItem> {
    split_top_level(projection)
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse_item)
        .collect()
}

fn parse_item(item: &str) -> ProjectionItem {
    if item == "*" {
        return ProjectionItem::All;
    }

    if let (Some(open), true) = (item.find('('), item.ends_with(')')) {
        let name = item[..open].trim();
        let inner = item[open + 1..item.len() - 1].trim();

        return match AggregateFunction::from_name(name) {
            Some(function) => ProjectionItem::Aggregate {
                function,
                column: (inner != "*").then(|| inner.to_string()),
            },
            None => ProjectionItem::Embedded {
                table: name.to_string(),
                projection: inner.to_string(),
            },
        };
    }

    ProjectionItem::Column(item.to_string())
}

/// Split on commas that are not inside parentheses
fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}
