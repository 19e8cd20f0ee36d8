pub mod employee_store;
