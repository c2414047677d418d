use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, AtomicI64, Ordering},
    Mutex,
};
use tokio::sync::Notify;

use staff_rota::{
    errors::StoreError,
    repositories::{
        employees::EmployeeDirectory,
        shifts::{ShiftRange, ShiftStore, StoredShifts},
    },
    rota::{
        model::{Employee, EmployeeId},
        records::{FlatShiftRecord, UnreadableShift},
    },
    structs::employees::NewEmployee,
};

/// In-memory shift store with switchable failures and an optional gate that
/// holds deletes until released.
#[derive(Default)]
pub struct MemoryShiftStore {
    rows: Mutex<Vec<FlatShiftRecord>>,
    unreadable: Mutex<Vec<UnreadableShift>>,
    fail_delete: AtomicBool,
    fail_insert: AtomicBool,
    gate: Option<Notify>,
}

impl MemoryShiftStore {
    pub fn with_rows(rows: Vec<FlatShiftRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Adds a row whose shift label the store cannot read back.
    pub fn push_unreadable(&self, row: UnreadableShift) {
        self.unreadable.lock().unwrap().push(row);
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::default()
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<FlatShiftRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShiftStore for MemoryShiftStore {
    async fn list_shifts_in_range(
        &self,
        range: &ShiftRange,
    ) -> Result<StoredShifts, StoreError> {
        let records = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.branch == range.branch && range.contains(r.date))
            .cloned()
            .collect();
        let unreadable = self
            .unreadable
            .lock()
            .unwrap()
            .iter()
            .filter(|r| range.contains(r.date))
            .cloned()
            .collect();
        Ok(StoredShifts {
            records,
            unreadable,
        })
    }

    async fn delete_shifts_in_range(&self, range: &ShiftRange) -> Result<u64, StoreError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("delete refused".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.branch == range.branch && range.contains(r.date)));
        Ok((before - rows.len()) as u64)
    }

    async fn bulk_insert_shifts(&self, records: &[FlatShiftRecord]) -> Result<u64, StoreError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("insert refused".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        rows.extend_from_slice(records);
        Ok(records.len() as u64)
    }
}

pub struct MemoryDirectory {
    employees: Mutex<Vec<(String, Employee)>>,
    next_id: AtomicI64,
}

impl MemoryDirectory {
    /// All employees belong to `branch`.
    pub fn new(branch: &str, employees: Vec<Employee>) -> Self {
        let next_id = employees.iter().map(|e| e.id.0).max().unwrap_or(0) + 1;
        Self {
            employees: Mutex::new(
                employees
                    .into_iter()
                    .map(|e| (branch.to_string(), e))
                    .collect(),
            ),
            next_id: AtomicI64::new(next_id),
        }
    }

    pub fn len(&self) -> usize {
        self.employees.lock().unwrap().len()
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryDirectory {
    async fn schedulable_employees(
        &self,
        branch: &str,
        roles: &[String],
    ) -> Result<Vec<Employee>, StoreError> {
        Ok(self
            .employees
            .lock()
            .unwrap()
            .iter()
            .filter(|(b, e)| b == branch && roles.contains(&e.role))
            .map(|(_, e)| e.clone())
            .collect())
    }

    async fn find_by_names(
        &self,
        branch: &str,
        names: &[String],
    ) -> Result<Vec<Employee>, StoreError> {
        Ok(self
            .employees
            .lock()
            .unwrap()
            .iter()
            .filter(|(b, e)| {
                b == branch
                    && names.iter().any(|name| {
                        e.name.eq_ignore_ascii_case(name.trim()) || e.id.0.to_string() == *name
                    })
            })
            .map(|(_, e)| e.clone())
            .collect())
    }

    async fn create_employee(&self, new_employee: NewEmployee) -> Result<Employee, StoreError> {
        let employee = Employee {
            id: EmployeeId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            name: new_employee.name,
            role: new_employee.role,
            avatar: None,
        };
        self.employees
            .lock()
            .unwrap()
            .push((new_employee.branch, employee.clone()));
        Ok(employee)
    }
}
