use super::{heading, plain, render_frame};
use crate::keys::{self, Binding, Domain};
use crate::tui::screen::{Action, Context, Screen, ScreenId};
use crate::tui::theme;
use crate::tui::widgets::input::{InputField, TextInput};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use serde_json::{json, Map, Value};

const DESCRIBE_EXAMPLE: &str =
    "Find all engineers hired after 2024 with standard security clearance";

/// Record fields offered in the field selectors, as (label, key).
const FIELDS: [(&str, &str); 10] = [
    ("ID", "id"),
    ("First Name", "first_name"),
    ("Last Name", "last_name"),
    ("Email", "email"),
    ("Department", "department"),
    ("Status", "status"),
    ("Hire Date", "hire_date"),
    ("Security Clearance", "security_clearance"),
    ("Employee ID", "employee_id"),
    ("Phone", "phone"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Like,
    In,
}

impl Operator {
    const ALL: [Operator; 6] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Lt,
        Self::Like,
        Self::In,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Lt => "$lt",
            Self::Like => "$like",
            Self::In => "$in",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Eq => "equals",
            Self::Ne => "not equals",
            Self::Gt => "greater than",
            Self::Lt => "less than",
            Self::Like => "contains",
            Self::In => "in list",
        }
    }

    fn cycled(self, forward: bool) -> Self {
        let i = Self::ALL.iter().position(|op| *op == self).unwrap_or(0);
        let len = Self::ALL.len();
        Self::ALL[if forward { (i + 1) % len } else { (i + len - 1) % len }]
    }
}

/// `{field: {op: value}}`, or None when the value is blank.
/// `$in` takes a comma separated list.
fn condition(field: &str, op: Operator, value: &str) -> Option<Value> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let operand = match op {
        Operator::In => Value::Array(
            value
                .split(',')
                .map(|item| Value::String(item.trim().to_string()))
                .collect(),
        ),
        _ => Value::String(value.to_string()),
    };
    let mut inner = Map::new();
    inner.insert(op.key().to_string(), operand);
    let mut outer = Map::new();
    outer.insert(field.to_string(), Value::Object(inner));
    Some(Value::Object(outer))
}

/// One condition stands alone, several are joined with `$and`, none is `{}`.
fn combine(mut conditions: Vec<Value>) -> Value {
    match conditions.len() {
        0 => json!({}),
        1 => conditions.remove(0),
        _ => json!({ "$and": conditions }),
    }
}

/// Keyword rules turning a plain-English request into a filter.
fn convert_natural_language(text: &str) -> Option<Value> {
    let text = text.to_lowercase();
    let rules = [
        ("engineer", "department", "$eq", "engineering"),
        ("after 2024", "hire_date", "$gt", "2024-01-01"),
        ("standard security", "security_clearance", "$eq", "standard"),
        ("active", "status", "$eq", "active"),
        ("suspended", "status", "$eq", "suspended"),
        ("sales", "department", "$eq", "sales"),
        ("marketing", "department", "$eq", "marketing"),
    ];
    let conditions: Vec<Value> = rules
        .iter()
        .filter(|(needle, ..)| text.contains(needle))
        .map(|(_, field, op, value)| json!({ (*field): { (*op): *value } }))
        .collect();
    (!conditions.is_empty()).then(|| combine(conditions))
}

#[derive(Debug)]
struct Condition {
    field: usize,
    op: Operator,
    value: TextInput,
}

impl Condition {
    fn new() -> Self {
        Self {
            field: 0,
            op: Operator::Eq,
            value: TextInput::new(),
        }
    }

    fn build(&self) -> Option<Value> {
        condition(FIELDS[self.field].1, self.op, self.value.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Describe,
    Field(usize),
    Op(usize),
    Value(usize),
}

impl Focus {
    const ORDER: [Focus; 7] = [
        Self::Describe,
        Self::Field(0),
        Self::Op(0),
        Self::Value(0),
        Self::Field(1),
        Self::Op(1),
        Self::Value(1),
    ];

    fn step(self, forward: bool) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let len = Self::ORDER.len();
        Self::ORDER[if forward { (i + 1) % len } else { (i + len - 1) % len }]
    }
}

/// Query construction terminal: builds the filter for a population search.
///
/// The finished filter is left in [`Context::query_filter`] for the screen
/// below to pick up when it resumes.
#[derive(Debug)]
pub struct FilterBuilder {
    schema: String,
    describe: TextInput,
    conditions: [Condition; 2],
    /// Result of the last plain-English conversion, until a condition changes.
    converted: Option<Value>,
    focus: Focus,
}

impl FilterBuilder {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            describe: TextInput::with_text(DESCRIBE_EXAMPLE),
            conditions: [Condition::new(), Condition::new()],
            converted: None,
            focus: Focus::Describe,
        }
    }

    /// Filter from the manual conditions.
    fn build_query(&self) -> Value {
        combine(self.conditions.iter().filter_map(Condition::build).collect())
    }

    fn query(&self) -> Value {
        self.converted.clone().unwrap_or_else(|| self.build_query())
    }

    fn convert(&mut self) -> Vec<Action> {
        if self.describe.is_empty() {
            return vec![Action::warning("Describe the records to find first")];
        }
        match convert_natural_language(self.describe.value()) {
            Some(query) => {
                self.converted = Some(query);
                vec![Action::success("Query converted. [ENTER] on a condition executes it")]
            }
            None => {
                self.converted = None;
                vec![Action::warning(
                    "Could not parse query - try being more specific",
                )]
            }
        }
    }

    fn execute(&mut self, ctx: &mut Context) -> Vec<Action> {
        let query = self.query();
        let message = if query.as_object().is_some_and(Map::is_empty) {
            "Filter cleared".to_string()
        } else {
            format!("Filter applied: {query}")
        };
        ctx.query_filter = Some(query);
        vec![Action::Pop, Action::info(message)]
    }

    fn clear(&mut self) -> Vec<Action> {
        self.describe.take();
        self.conditions = [Condition::new(), Condition::new()];
        self.converted = None;
        self.focus = Focus::Describe;
        vec![Action::info("All conditions cleared")]
    }

    fn cycle_choice(&mut self, index: usize, field: bool, forward: bool) {
        let condition = &mut self.conditions[index];
        if field {
            let len = FIELDS.len();
            condition.field = if forward {
                (condition.field + 1) % len
            } else {
                (condition.field + len - 1) % len
            };
        } else {
            condition.op = condition.op.cycled(forward);
        }
        self.converted = None;
    }

    fn choice_line(&self, label: &str, choice: String, focused: bool) -> Line<'static> {
        let style = if focused { theme::title() } else { theme::dim() };
        let value_style = if focused { theme::selected() } else { theme::text() };
        Line::from(vec![
            Span::styled(format!("{label}: "), style),
            Span::styled(format!(" ◀ {choice} ▶ "), value_style),
        ])
    }
}

impl Screen for FilterBuilder {
    fn id(&self) -> ScreenId {
        ScreenId::FilterBuilder
    }

    fn title(&self) -> String {
        format!("QUERY CONSTRUCTION TERMINAL - {}", self.schema)
    }

    fn bindings(&self) -> Vec<Binding> {
        let enter = if self.focus == Focus::Describe {
            Binding::new(keys::ENTER, "ai_convert", "Convert")
        } else {
            Binding::new(keys::ENTER, "execute_filter", "Execute")
        };
        vec![
            enter,
            Binding::new("tab", "next_field", "Next Field"),
            Binding::new("ctrl+x", "execute_filter", "Execute"),
            Binding::new("ctrl+l", "clear_all", "Clear All"),
            Binding::new(keys::CANCEL, "cancel_filter", "Cancel"),
        ]
    }

    fn domain(&self) -> Option<Domain> {
        Some(Domain::Data)
    }

    fn captures_text(&self) -> bool {
        true
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Vec<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return vec![Action::Pop, Action::info("Filter cancelled")],
            KeyCode::Char('x') if ctrl => return self.execute(ctx),
            KeyCode::Char('l') if ctrl => return self.clear(),
            KeyCode::Enter if self.focus == Focus::Describe => return self.convert(),
            KeyCode::Enter => return self.execute(ctx),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.step(true);
                return Vec::new();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.step(false);
                return Vec::new();
            }
            _ => {}
        }

        match self.focus {
            Focus::Describe => {
                self.describe.handle_key(key);
            }
            Focus::Field(i) | Focus::Op(i) => {
                let field = matches!(self.focus, Focus::Field(_));
                match key.code {
                    KeyCode::Right | KeyCode::Char(' ') => self.cycle_choice(i, field, true),
                    KeyCode::Left => self.cycle_choice(i, field, false),
                    _ => {}
                }
            }
            Focus::Value(i) => {
                if self.conditions[i].value.handle_key(key) {
                    self.converted = None;
                }
            }
        }
        Vec::new()
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &Context) {
        let intro = vec![
            heading("AI QUERY ASSISTANT"),
            plain("Describe your search in plain English; [ENTER] converts it to a filter."),
        ];
        let body = render_frame(frame, area, &self.title(), intro);

        let mut constraints = vec![Constraint::Length(2), Constraint::Length(1)];
        for _ in &self.conditions {
            constraints.extend([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(2),
            ]);
        }
        constraints.extend([Constraint::Length(1), Constraint::Min(0)]);
        let rows = Layout::vertical(constraints).split(body);

        frame.render_widget(
            InputField::new("DESCRIBE", &self.describe, self.focus == Focus::Describe),
            rows[0],
        );
        frame.render_widget(Paragraph::new(heading("MANUAL FILTER BUILDER")), rows[1]);

        for (i, condition) in self.conditions.iter().enumerate() {
            let base = 2 + i * 4;
            frame.render_widget(
                Paragraph::new(plain(format!("CONDITION GROUP {}", i + 1))),
                rows[base],
            );
            frame.render_widget(
                Paragraph::new(self.choice_line(
                    "FIELD",
                    FIELDS[condition.field].0.to_string(),
                    self.focus == Focus::Field(i),
                )),
                rows[base + 1],
            );
            frame.render_widget(
                Paragraph::new(self.choice_line(
                    "OP",
                    condition.op.label().to_string(),
                    self.focus == Focus::Op(i),
                )),
                rows[base + 2],
            );
            frame.render_widget(
                InputField::new("VALUE", &condition.value, self.focus == Focus::Value(i)),
                rows[base + 3],
            );
        }

        let preview_at = 2 + self.conditions.len() * 4;
        frame.render_widget(
            Paragraph::new(heading("Generated Query Preview:")),
            rows[preview_at],
        );
        let preview = serde_json::to_string_pretty(&self.query())
            .unwrap_or_else(|_| "{}".to_string());
        let lines: Vec<Line> = preview.lines().map(|l| plain(l.to_string())).collect();
        frame.render_widget(Paragraph::new(lines), rows[preview_at + 1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(screen: &mut FilterBuilder, ctx: &mut Context, text: &str) {
        for c in text.chars() {
            screen.handle_key(press(KeyCode::Char(c)), ctx);
        }
    }

    #[test]
    fn test_in_operator_splits_on_commas() {
        assert_eq!(
            condition("department", Operator::In, "engineering, sales ,marketing"),
            Some(json!({"department": {"$in": ["engineering", "sales", "marketing"]}}))
        );
        assert_eq!(
            condition("status", Operator::Ne, " active "),
            Some(json!({"status": {"$ne": "active"}}))
        );
        assert_eq!(condition("status", Operator::Eq, "   "), None);
    }

    #[test]
    fn test_conditions_are_joined_with_and() {
        let a = json!({"department": {"$eq": "engineering"}});
        let b = json!({"status": {"$in": ["active", "on_leave"]}});
        assert_eq!(combine(vec![]), json!({}));
        assert_eq!(combine(vec![a.clone()]), a);
        assert_eq!(
            combine(vec![a.clone(), b.clone()]),
            json!({"$and": [a, b]})
        );
    }

    #[test]
    fn test_natural_language_rules() {
        assert_eq!(
            convert_natural_language(DESCRIBE_EXAMPLE),
            Some(json!({"$and": [
                {"department": {"$eq": "engineering"}},
                {"hire_date": {"$gt": "2024-01-01"}},
                {"security_clearance": {"$eq": "standard"}}
            ]}))
        );
        assert_eq!(
            convert_natural_language("Suspended staff"),
            Some(json!({"status": {"$eq": "suspended"}}))
        );
        assert_eq!(convert_natural_language("everyone named Bob"), None);
    }

    #[test]
    fn test_manual_conditions_build_and_query() {
        let mut screen = FilterBuilder::new("personnel_records");
        let mut ctx = Context::default();

        // Field 1: Department, in list.
        screen.handle_key(press(KeyCode::Tab), &mut ctx);
        for _ in 0..4 {
            screen.handle_key(press(KeyCode::Right), &mut ctx);
        }
        screen.handle_key(press(KeyCode::Tab), &mut ctx);
        screen.handle_key(press(KeyCode::Left), &mut ctx);
        screen.handle_key(press(KeyCode::Tab), &mut ctx);
        type_text(&mut screen, &mut ctx, "engineering,sales");

        // Field 2: Status, equals.
        screen.handle_key(press(KeyCode::Tab), &mut ctx);
        for _ in 0..5 {
            screen.handle_key(press(KeyCode::Right), &mut ctx);
        }
        screen.handle_key(press(KeyCode::Tab), &mut ctx);
        screen.handle_key(press(KeyCode::Tab), &mut ctx);
        type_text(&mut screen, &mut ctx, "active");

        let actions = screen.handle_key(press(KeyCode::Enter), &mut ctx);
        assert!(matches!(actions.first(), Some(Action::Pop)));
        assert_eq!(
            ctx.query_filter,
            Some(json!({"$and": [
                {"department": {"$in": ["engineering", "sales"]}},
                {"status": {"$eq": "active"}}
            ]}))
        );
    }

    #[test]
    fn test_convert_then_execute() {
        let mut screen = FilterBuilder::new("personnel_records");
        let mut ctx = Context::default();
        let actions = screen.handle_key(press(KeyCode::Enter), &mut ctx);
        assert!(matches!(&actions[..], [Action::Status(_, m)] if m.starts_with("Query converted")));
        assert!(ctx.query_filter.is_none());

        let ctrl_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        screen.handle_key(ctrl_x, &mut ctx);
        assert_eq!(ctx.query_filter, convert_natural_language(DESCRIBE_EXAMPLE));
    }

    #[test]
    fn test_editing_a_condition_discards_conversion() {
        let mut screen = FilterBuilder::new("personnel_records");
        let mut ctx = Context::default();
        screen.handle_key(press(KeyCode::Enter), &mut ctx);
        assert!(screen.converted.is_some());

        screen.focus = Focus::Value(0);
        type_text(&mut screen, &mut ctx, "42");
        assert!(screen.converted.is_none());
        assert_eq!(screen.query(), json!({"id": {"$eq": "42"}}));
    }

    #[test]
    fn test_unparseable_description_and_clear() {
        let mut screen = FilterBuilder::new("personnel_records");
        let mut ctx = Context::default();
        screen.describe.set("who knows");
        let actions = screen.handle_key(press(KeyCode::Enter), &mut ctx);
        assert!(matches!(&actions[..], [Action::Status(_, m)] if m.starts_with("Could not parse")));

        let ctrl_l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);
        screen.handle_key(ctrl_l, &mut ctx);
        assert!(screen.describe.is_empty());

        let ctrl_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        let actions = screen.handle_key(ctrl_x, &mut ctx);
        assert_eq!(ctx.query_filter, Some(json!({})));
        assert!(matches!(&actions[..], [Action::Pop, Action::Status(_, m)] if m == "Filter cleared"));
    }

    #[test]
    fn test_escape_leaves_filter_untouched() {
        let mut screen = FilterBuilder::new("personnel_records");
        let mut ctx = Context::default();
        let actions = screen.handle_key(press(KeyCode::Esc), &mut ctx);
        assert!(matches!(actions.first(), Some(Action::Pop)));
        assert!(ctx.query_filter.is_none());
    }
}
