use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
    Boolean,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    IsTrue,
    IsFalse,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    NotContains,
    AfterDate,
    BeforeDate,
    OnDate,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::IsTrue => "is-true",
            Operator::IsFalse => "is-false",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::Contains => "contains",
            Operator::NotContains => "!contains",
            Operator::AfterDate => "after",
            Operator::BeforeDate => "before",
            Operator::OnDate => "on",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Operator::Equal => "Equal",
            Operator::NotEqual => "Not equal",
            Operator::IsTrue => "Is true",
            Operator::IsFalse => "Is false",
            Operator::GreaterThan => "Greater than",
            Operator::GreaterThanOrEqual => "Greater than or equal",
            Operator::LessThan => "Less than",
            Operator::LessThanOrEqual => "Less than or equal",
            Operator::Contains => "Contains",
            Operator::NotContains => "Does not contain",
            Operator::AfterDate => "After Date",
            Operator::BeforeDate => "Before Date",
            Operator::OnDate => "On Day",
        }
    }

    pub fn is_date(self) -> bool {
        matches!(
            self,
            Operator::AfterDate | Operator::BeforeDate | Operator::OnDate
        )
    }

    /// Unary operators carry no value; the filter is complete at pick time.
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::IsTrue | Operator::IsFalse)
    }

    pub fn applicable_types(self) -> &'static [ValueType] {
        match self {
            Operator::Equal | Operator::NotEqual => &[ValueType::Number, ValueType::String],
            Operator::IsTrue | Operator::IsFalse => &[ValueType::Boolean],
            Operator::GreaterThan
            | Operator::GreaterThanOrEqual
            | Operator::LessThan
            | Operator::LessThanOrEqual => &[ValueType::Number],
            Operator::Contains | Operator::NotContains => &[ValueType::String],
            Operator::AfterDate | Operator::BeforeDate | Operator::OnDate => {
                &[ValueType::Timestamp]
            }
        }
    }
}

pub const OPERATOR_CATALOG: [Operator; 13] = [
    Operator::Equal,
    Operator::NotEqual,
    Operator::IsTrue,
    Operator::IsFalse,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqual,
    Operator::LessThan,
    Operator::LessThanOrEqual,
    Operator::Contains,
    Operator::NotContains,
    Operator::AfterDate,
    Operator::BeforeDate,
    Operator::OnDate,
];

pub fn operators_for_types(types: &[ValueType]) -> Vec<Operator> {
    OPERATOR_CATALOG
        .into_iter()
        .filter(|operator| {
            operator
                .applicable_types()
                .iter()
                .any(|candidate| types.contains(candidate))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinition {
    pub operator: Operator,
    pub path: String,
    pub value: Option<String>,
}

impl FilterDefinition {
    pub fn id(&self) -> String {
        format!(
            "{}{}{}",
            self.path,
            self.operator.symbol(),
            self.value.as_deref().unwrap_or_default()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLike {
    pub label: String,
    pub path: String,
    pub types: Option<Vec<ValueType>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterItem {
    pub label: String,
    pub description: String,
    pub id: String,
}

pub fn iso_today() -> String {
    let format = format_description!("[year]-[month]-[day]");
    OffsetDateTime::now_utc().format(&format).unwrap_or_default()
}

pub fn is_free_text_date(text: &str) -> bool {
    let format = format_description!("[year]-[month]-[day]");
    time::Date::parse(text.trim(), &format).is_ok()
}

/// Interactive surface the host shell provides. Every method returning
/// `Option` models the user dismissing the prompt.
pub trait FilterPrompts {
    fn pick_column(&mut self, columns: &[ColumnLike]) -> Option<ColumnLike>;
    fn pick_operator(&mut self, operators: &[Operator]) -> Option<Operator>;
    fn input_value(&mut self, default: Option<&str>) -> Option<String>;
    fn show_validation_message(&mut self, message: &str);
    fn pick_filters(&mut self, items: &[FilterItem]) -> Option<Vec<String>>;
    fn show_error(&mut self, message: &str);
}

pub fn pick_filter_to_add(
    columns: &[ColumnLike],
    prompts: &mut dyn FilterPrompts,
) -> Option<FilterDefinition> {
    if columns.is_empty() {
        prompts.show_error("There are no columns to filter by.");
        return None;
    }

    let picked = prompts.pick_column(columns)?;
    let operators = operators_for_types(picked.types.as_deref().unwrap_or_default());
    let operator = prompts.pick_operator(&operators)?;

    if operator.is_unary() {
        return Some(FilterDefinition {
            operator,
            path: picked.path,
            value: None,
        });
    }

    let value = if operator.is_date() {
        prompt_for_date(prompts)?
    } else {
        prompts.input_value(None).filter(|value| !value.is_empty())?
    };

    Some(FilterDefinition {
        operator,
        path: picked.path,
        value: Some(value),
    })
}

fn prompt_for_date(prompts: &mut dyn FilterPrompts) -> Option<String> {
    let default = iso_today();
    loop {
        let value = prompts.input_value(Some(&default))?;
        if is_free_text_date(&value) {
            return Some(value);
        }
        prompts.show_validation_message("please enter a valid date of the form yyyy-mm-dd");
    }
}

pub fn pick_filters_to_remove(
    filters: &[FilterDefinition],
    prompts: &mut dyn FilterPrompts,
) -> Option<Vec<String>> {
    if filters.is_empty() {
        prompts.show_error("There are no filters to remove.");
        return None;
    }

    let items = filters
        .iter()
        .map(|filter| FilterItem {
            label: filter.path.clone(),
            description: format!(
                "{} {}",
                filter.operator.symbol(),
                filter.value.as_deref().unwrap_or_default()
            ),
            id: filter.id(),
        })
        .collect::<Vec<_>>();

    prompts.pick_filters(&items)
}
