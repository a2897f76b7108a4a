use crate::model::{Amount, BudgetEntry, Category, NewTransaction, TransactionType};
use crate::Result;
use anyhow::bail;
use chrono::NaiveDate;
use serde_json::Value;

/// How the sub-category field is offered for the form's current type and category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubCategoryInput {
    /// Credits have no sub-category field.
    Hidden,
    /// Pick one of the known sub-categories of the chosen category. A choice is required.
    Choice(Vec<String>),
    /// No sub-categories are known for the chosen category, so any text is accepted.
    FreeText,
}

/// The state of the transaction entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseForm {
    date: String,
    amount: String,
    kind: TransactionType,
    category: Category,
    sub_category: String,
    description: String,
}

impl ExpenseForm {
    /// A blank form dated `today`: a `Debit` in the `Personal` category.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: iso_date(today),
            amount: String::new(),
            kind: TransactionType::default(),
            category: Category::default(),
            sub_category: String::new(),
            description: String::new(),
        }
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.amount = amount.into();
    }

    pub fn set_kind(&mut self, kind: TransactionType) {
        self.kind = kind;
    }

    /// Changing the category clears the sub-category, which belonged to the old category.
    pub fn set_category(&mut self, category: Category) {
        self.category = category;
        self.sub_category.clear();
    }

    pub fn set_sub_category(&mut self, sub_category: impl Into<String>) {
        self.sub_category = sub_category.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn sub_category(&self) -> &str {
        &self.sub_category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The known sub-categories of the chosen category, in budget order.
    pub fn sub_category_choices(&self, budgets: &[BudgetEntry]) -> Vec<String> {
        let category = self.category.to_string();
        budgets
            .iter()
            .filter(|b| b.category() == category)
            .map(|b| b.sub_category().to_string())
            .collect()
    }

    pub fn sub_category_input(&self, budgets: &[BudgetEntry]) -> SubCategoryInput {
        if self.kind == TransactionType::Credit {
            return SubCategoryInput::Hidden;
        }
        let choices = self.sub_category_choices(budgets);
        if choices.is_empty() {
            SubCategoryInput::FreeText
        } else {
            SubCategoryInput::Choice(choices)
        }
    }

    /// Checks the form the way its inputs would and builds the request body.
    pub fn to_request(&self, budgets: &[BudgetEntry]) -> Result<NewTransaction> {
        if self.date.is_empty() {
            bail!("Date is required");
        }
        if self.amount.is_empty() {
            bail!("Amount is required");
        }
        if Amount::parse(&self.amount).is_nan() {
            bail!("Amount '{}' is not a number", self.amount);
        }
        if let SubCategoryInput::Choice(choices) = self.sub_category_input(budgets) {
            if !choices.iter().any(|c| c == &self.sub_category) {
                bail!(
                    "Select a sub-category of {}: {}",
                    self.category,
                    choices.join(", ")
                );
            }
        }
        Ok(NewTransaction {
            amount: Some(Value::String(self.amount.clone())),
            description: Some(Value::String(self.description.clone())),
            category: Some(Value::String(self.category.to_string())),
            kind: Some(Value::String(self.kind.to_string())),
            sub_category: Some(Value::String(self.sub_category.clone())),
            date: Some(Value::String(self.date.clone())),
        })
    }

    /// Clears the form after a successful submit. Type and category are kept.
    pub fn reset(&mut self, today: NaiveDate) {
        self.date = iso_date(today);
        self.amount.clear();
        self.description.clear();
        self.sub_category.clear();
    }
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn budgets() -> Vec<BudgetEntry> {
        vec![
            BudgetEntry::new("House", "Rent", Decimal::from(15000)),
            BudgetEntry::new("Personal", "Fitness", Decimal::from(1500)),
            BudgetEntry::new("House", "Wifi", Decimal::from(1000)),
        ]
    }

    #[test]
    fn test_defaults() {
        let form = ExpenseForm::new(today());
        assert_eq!(form.date(), "2024-06-15");
        assert_eq!(form.kind(), TransactionType::Debit);
        assert_eq!(form.category(), Category::Personal);
        assert_eq!(form.amount(), "");
    }

    #[test]
    fn test_sub_category_input() {
        let mut form = ExpenseForm::new(today());
        form.set_category(Category::House);
        assert_eq!(
            form.sub_category_input(&budgets()),
            SubCategoryInput::Choice(vec!["Rent".to_string(), "Wifi".to_string()])
        );
        assert_eq!(form.sub_category_input(&[]), SubCategoryInput::FreeText);

        form.set_kind(TransactionType::Credit);
        assert_eq!(form.sub_category_input(&budgets()), SubCategoryInput::Hidden);
    }

    #[test]
    fn test_set_category_clears_sub_category() {
        let mut form = ExpenseForm::new(today());
        form.set_sub_category("Fitness");
        form.set_category(Category::House);
        assert_eq!(form.sub_category(), "");
    }

    #[test]
    fn test_to_request() {
        let mut form = ExpenseForm::new(today());
        form.set_category(Category::House);
        form.set_amount("15000");
        form.set_sub_category("Rent");
        form.set_description("June rent");
        let request = form.to_request(&budgets()).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "amount": "15000",
                "description": "June rent",
                "category": "House",
                "type": "Debit",
                "subCategory": "Rent",
                "date": "2024-06-15"
            })
        );
    }

    #[test]
    fn test_to_request_checks_inputs() {
        let mut form = ExpenseForm::new(today());
        assert!(form.to_request(&[]).is_err());

        form.set_amount("abc");
        assert!(form.to_request(&[]).is_err());

        form.set_amount("12");
        assert!(form.to_request(&[]).is_ok());

        // Known sub-categories make the choice required.
        assert!(form.to_request(&budgets()).is_err());
        form.set_sub_category("Gym");
        assert!(form.to_request(&budgets()).is_err());
        form.set_sub_category("Fitness");
        assert!(form.to_request(&budgets()).is_ok());

        form.set_date("");
        assert!(form.to_request(&budgets()).is_err());
    }

    #[test]
    fn test_credit_needs_no_sub_category() {
        let mut form = ExpenseForm::new(today());
        form.set_kind(TransactionType::Credit);
        form.set_amount("85000");
        assert!(form.to_request(&budgets()).is_ok());
    }

    #[test]
    fn test_reset_keeps_type_and_category() {
        let mut form = ExpenseForm::new(today());
        form.set_kind(TransactionType::Credit);
        form.set_category(Category::House);
        form.set_amount("10");
        form.set_description("Refund");
        form.set_date("2024-06-01");
        form.reset(NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());

        let mut expected = ExpenseForm::new(NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
        expected.set_kind(TransactionType::Credit);
        expected.set_category(Category::House);
        assert_eq!(form, expected);
    }
}
