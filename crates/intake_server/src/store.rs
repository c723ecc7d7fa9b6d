use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use shared::{
    domain::CalculatorId,
    error::{ErrorCode, IntakeRejection},
};
use tokio::sync::RwLock;
use uuid::Uuid;

const DEFAULT_CALCULATOR_NAME: &str = "default_calculator";

#[derive(Debug, Clone)]
pub struct StoredPdf {
    pub filename: String,
    pub size_bytes: usize,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Calculator {
    pub id: CalculatorId,
    pub name: String,
    pub pdfs: Vec<StoredPdf>,
    pub is_calculated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory calculator sessions keyed by the identifier handed to clients.
#[derive(Clone, Default)]
pub struct CalculatorStore {
    inner: Arc<RwLock<HashMap<CalculatorId, Calculator>>>,
}

impl CalculatorStore {
    pub async fn create(&self) -> CalculatorId {
        let id = CalculatorId::new(Uuid::new_v4().simple().to_string());
        let now = Utc::now();
        self.inner.write().await.insert(
            id.clone(),
            Calculator {
                id: id.clone(),
                name: DEFAULT_CALCULATOR_NAME.to_string(),
                pdfs: Vec::new(),
                is_calculated: false,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Stores the PDF under `calculator_id`, or under a new calculator when
    /// the client does not hold one yet.
    pub async fn attach_pdf(
        &self,
        calculator_id: Option<&CalculatorId>,
        filename: &str,
        size_bytes: usize,
    ) -> Result<CalculatorId, IntakeRejection> {
        let id = match calculator_id {
            Some(id) => id.clone(),
            None => self.create().await,
        };

        let mut guard = self.inner.write().await;
        let calculator = guard
            .get_mut(&id)
            .ok_or_else(|| IntakeRejection::from(ErrorCode::CalculatorNotFound))?;
        let now = Utc::now();
        calculator.pdfs.push(StoredPdf {
            filename: filename.to_string(),
            size_bytes,
            uploaded_at: now,
        });
        calculator.updated_at = now;
        Ok(id)
    }

    pub async fn mark_calculated(&self, id: &CalculatorId) -> Result<Calculator, IntakeRejection> {
        let mut guard = self.inner.write().await;
        let calculator = guard
            .get_mut(id)
            .ok_or_else(|| IntakeRejection::from(ErrorCode::CalculatorNotFound))?;
        calculator.is_calculated = true;
        calculator.updated_at = Utc::now();
        Ok(calculator.clone())
    }

    pub async fn get(&self, id: &CalculatorId) -> Option<Calculator> {
        self.inner.read().await.get(id).cloned()
    }
}
