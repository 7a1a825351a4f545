//! Payroll: batches, per-employee payroll lines and payslips.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    employee::default_currency, require_non_empty, require_non_negative, round_money, Resource,
};
use crate::errors::AppError;

/// Employee share of statutory social insurance, applied to the basic salary.
pub const SOCIAL_INSURANCE_RATE: f64 = 0.11;

/// A labelled amount on a payslip or payroll line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayItem {
    pub label: String,
    pub amount: f64,
}

impl PayItem {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        Self {
            label: label.into(),
            amount: round_money(amount),
        }
    }
}

fn sum_items(items: &[PayItem]) -> f64 {
    round_money(items.iter().map(|i| i.amount).sum())
}

fn validate_items(items: &[PayItem], kind: &str) -> Result<(), AppError> {
    for item in items {
        require_non_empty(&item.label, &format!("{} label", kind))?;
        require_non_negative(item.amount, &format!("{} '{}'", kind, item.label))?;
    }
    Ok(())
}

/// Check a `YYYY-MM` payroll period.
pub fn validate_period(period: &str) -> Result<(), AppError> {
    let valid = period.len() == 7
        && NaiveDate::parse_from_str(&format!("{}-01", period), "%Y-%m-%d").is_ok();
    if !valid {
        return Err(AppError::validation(format!(
            "Period '{}' must be formatted as YYYY-MM",
            period
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayslipStatus {
    Draft,
    Issued,
    Paid,
    Cancelled,
}

impl Default for PayslipStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// A monthly payslip for one employee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    pub employee_id: String,
    pub period: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub earnings: Vec<PayItem>,
    #[serde(default)]
    pub deductions: Vec<PayItem>,
    #[serde(default)]
    pub gross_pay: f64,
    #[serde(default)]
    pub total_deductions: f64,
    #[serde(default)]
    pub net_pay: f64,
    #[serde(default)]
    pub status: PayslipStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
}

impl Resource for Payslip {
    const COLLECTION: &'static str = "payslips";
    const ID_PREFIX: &'static str = "PS";
    const LABEL: &'static str = "Payslip";
    const FILTER_FIELDS: &'static [&'static str] = &["employeeId", "period", "status", "batchId"];

    fn normalize(&mut self) {
        self.gross_pay = sum_items(&self.earnings);
        self.total_deductions = sum_items(&self.deductions);
        self.net_pay = round_money(self.gross_pay - self.total_deductions);
    }

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.employee_id, "Employee")?;
        validate_period(&self.period)?;
        validate_items(&self.earnings, "Earning")?;
        validate_items(&self.deductions, "Deduction")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmployeePayrollStatus {
    Pending,
    Calculated,
    Paid,
}

impl Default for EmployeePayrollStatus {
    fn default() -> Self {
        Self::Calculated
    }
}

/// One employee's line within a payroll batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayroll {
    pub batch_id: String,
    pub employee_id: String,
    pub basic_salary: f64,
    #[serde(default)]
    pub allowances: Vec<PayItem>,
    #[serde(default)]
    pub deductions: Vec<PayItem>,
    #[serde(default)]
    pub overtime: f64,
    #[serde(default)]
    pub gross_salary: f64,
    #[serde(default)]
    pub total_deductions: f64,
    #[serde(default)]
    pub net_salary: f64,
    #[serde(default)]
    pub status: EmployeePayrollStatus,
}

impl EmployeePayroll {
    /// Default line for an employee: basic salary less social insurance.
    pub fn for_employee(batch_id: &str, employee_id: &str, basic_salary: f64) -> Self {
        let mut line = Self {
            batch_id: batch_id.to_string(),
            employee_id: employee_id.to_string(),
            basic_salary: round_money(basic_salary),
            allowances: Vec::new(),
            deductions: vec![PayItem::new(
                "Social insurance",
                basic_salary * SOCIAL_INSURANCE_RATE,
            )],
            overtime: 0.0,
            gross_salary: 0.0,
            total_deductions: 0.0,
            net_salary: 0.0,
            status: EmployeePayrollStatus::Calculated,
        };
        line.normalize();
        line
    }

    /// Payslip content for this line.
    pub fn to_payslip(&self, period: &str, currency: &str) -> Payslip {
        let mut earnings = vec![PayItem::new("Basic salary", self.basic_salary)];
        earnings.extend(self.allowances.iter().cloned());
        if self.overtime > 0.0 {
            earnings.push(PayItem::new("Overtime", self.overtime));
        }
        let mut payslip = Payslip {
            employee_id: self.employee_id.clone(),
            period: period.to_string(),
            currency: currency.to_string(),
            earnings,
            deductions: self.deductions.clone(),
            gross_pay: 0.0,
            total_deductions: 0.0,
            net_pay: 0.0,
            status: PayslipStatus::Issued,
            batch_id: Some(self.batch_id.clone()),
        };
        payslip.normalize();
        payslip
    }
}

impl Resource for EmployeePayroll {
    const COLLECTION: &'static str = "employee_payrolls";
    const ID_PREFIX: &'static str = "EPR";
    const LABEL: &'static str = "Employee payroll";
    const FILTER_FIELDS: &'static [&'static str] = &["batchId", "employeeId", "status"];

    fn normalize(&mut self) {
        self.basic_salary = round_money(self.basic_salary);
        self.overtime = round_money(self.overtime);
        self.gross_salary =
            round_money(self.basic_salary + sum_items(&self.allowances) + self.overtime);
        self.total_deductions = sum_items(&self.deductions);
        self.net_salary = round_money(self.gross_salary - self.total_deductions);
    }

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.batch_id, "Batch")?;
        require_non_empty(&self.employee_id, "Employee")?;
        require_non_negative(self.basic_salary, "Basic salary")?;
        require_non_negative(self.overtime, "Overtime")?;
        validate_items(&self.allowances, "Allowance")?;
        validate_items(&self.deductions, "Deduction")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayrollBatchStatus {
    Draft,
    Processing,
    Approved,
    Paid,
    Cancelled,
}

impl Default for PayrollBatchStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// A payroll run for one period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayrollBatch {
    pub name: String,
    pub period: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub status: PayrollBatchStatus,
    #[serde(default)]
    pub employee_count: usize,
    #[serde(default)]
    pub total_gross: f64,
    #[serde(default)]
    pub total_deductions: f64,
    #[serde(default)]
    pub total_net: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

impl PayrollBatch {
    /// Replace the batch totals with the sums over `lines`.
    pub fn apply_totals<'a>(&mut self, lines: impl IntoIterator<Item = &'a EmployeePayroll>) {
        let mut count = 0;
        let (mut gross, mut deductions, mut net) = (0.0, 0.0, 0.0);
        for line in lines {
            count += 1;
            gross += line.gross_salary;
            deductions += line.total_deductions;
            net += line.net_salary;
        }
        self.employee_count = count;
        self.total_gross = round_money(gross);
        self.total_deductions = round_money(deductions);
        self.total_net = round_money(net);
        self.processed_at = Some(Utc::now());
    }
}

impl Resource for PayrollBatch {
    const COLLECTION: &'static str = "payroll_batches";
    const ID_PREFIX: &'static str = "PB";
    const LABEL: &'static str = "Payroll batch";
    const FILTER_FIELDS: &'static [&'static str] = &["period", "status"];

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.name, "Batch name")?;
        validate_period(&self.period)?;
        Ok(())
    }
}
