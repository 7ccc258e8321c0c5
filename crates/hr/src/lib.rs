//! HR module plugin: employee and timesheet records plus the AI-backed
//! workforce operations.

pub mod employee;
pub mod plugin;
pub mod timesheet;

pub use employee::{CreateEmployee, Employee, EmployeeStatus};
pub use plugin::{
    AttritionReport, AttritionRequest, HrError, HrPlugin, TalentPlan, TalentRequest,
};
pub use timesheet::{CreateTimesheet, Timesheet, TimesheetStatus};
