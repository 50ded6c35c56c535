//! Dashboard metrics service.
//!
//! Every call is a pass-through over `/dashboard/*`. `load_dashboard` is the
//! one opinionated entry point: when live data cannot be had it hands back a
//! bundled example dataset, always labelled as such. The example dataset is
//! illustrative only and never stands in for last-known values.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::token_enum;
use crate::net::client::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::ApiResponse;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_sales: f64,
    pub total_products: u64,
    pub conversion_rate: f64,
    pub sales_growth: f64,
    pub users_growth: f64,
    pub products_growth: f64,
    pub conversion_growth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Completed,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSale {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub amount: f64,
    pub currency: String,
    pub date: String,
    pub status: SaleStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    User,
    Product,
    Sale,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemActivity {
    pub id: String,
    pub action: String,
    pub description: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub recent_sales: Vec<RecentSale>,
    pub system_activities: Vec<SystemActivity>,
    pub sales_chart: Vec<ChartData>,
    pub users_chart: Vec<ChartData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportLink {
    pub download_url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartPeriod {
    Week,
    #[default]
    Month,
    Year,
}

token_enum!(ChartPeriod, "chart period", { Week => "week", Month => "month", Year => "year" });

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Sales,
    Users,
    Products,
}

token_enum!(ExportKind, "export kind", { Sales => "sales", Users => "users", Products => "products" });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

token_enum!(ExportFormat, "export format", { Csv => "csv", Xlsx => "xlsx" });

/// Where a [`DashboardView`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Example { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub data: DashboardData,
    #[serde(flatten)]
    pub source: DataSource,
}

impl DashboardView {
    #[must_use]
    pub fn is_example(&self) -> bool {
        matches!(self.source, DataSource::Example { .. })
    }
}

// =============================================================================
// SERVICE
// =============================================================================

pub const DEFAULT_LIST_LIMIT: u32 = 10;

#[derive(Clone)]
pub struct DashboardService {
    api: Arc<ApiClient>,
}

impl DashboardService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn get_dashboard_data(&self) -> Result<ApiResponse<DashboardData>, ApiError> {
        self.api.get("/dashboard").await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn get_stats(&self) -> Result<ApiResponse<DashboardStats>, ApiError> {
        self.api.get("/dashboard/stats").await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn get_recent_sales(&self, limit: u32) -> Result<ApiResponse<Vec<RecentSale>>, ApiError> {
        self.api.get(&format!("/dashboard/recent-sales?limit={limit}")).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn get_system_activities(&self, limit: u32) -> Result<ApiResponse<Vec<SystemActivity>>, ApiError> {
        self.api.get(&format!("/dashboard/activities?limit={limit}")).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn get_sales_chart(&self, period: ChartPeriod) -> Result<ApiResponse<Vec<ChartData>>, ApiError> {
        self.api.get(&format!("/dashboard/sales-chart?period={period}")).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn get_users_chart(&self, period: ChartPeriod) -> Result<ApiResponse<Vec<ChartData>>, ApiError> {
        self.api.get(&format!("/dashboard/users-chart?period={period}")).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn export_data(
        &self,
        kind: ExportKind,
        format: ExportFormat,
    ) -> Result<ApiResponse<ExportLink>, ApiError> {
        self.api.get(&format!("/dashboard/export/{kind}?format={format}")).await
    }

    /// Live dashboard data, or the labelled example dataset when the fetch
    /// fails in any way.
    pub async fn load_dashboard(&self) -> DashboardView {
        let reason = match self.get_dashboard_data().await {
            Ok(envelope) => {
                let message = envelope.message_or("failed to load dashboard data").to_owned();
                match envelope.into_success() {
                    Some(data) => return DashboardView { data, source: DataSource::Live },
                    None => message,
                }
            }
            Err(e) => e.to_string(),
        };
        tracing::warn!(%reason, "dashboard data unavailable, showing example data");
        DashboardView { data: example_dashboard(), source: DataSource::Example { reason } }
    }
}

// =============================================================================
// EXAMPLE DATASET
// =============================================================================

fn sale(id: &str, name: &str, email: &str, amount: f64, status: SaleStatus) -> RecentSale {
    RecentSale {
        id: id.to_owned(),
        customer_name: name.to_owned(),
        customer_email: email.to_owned(),
        amount,
        currency: "BRL".to_owned(),
        date: "2024-01-01".to_owned(),
        status,
    }
}

fn activity(id: &str, action: &str, description: &str, timestamp: &str, kind: ActivityKind) -> SystemActivity {
    SystemActivity {
        id: id.to_owned(),
        action: action.to_owned(),
        description: description.to_owned(),
        timestamp: timestamp.to_owned(),
        user: None,
        kind,
    }
}

/// Placeholder figures shown when no live data is available.
#[must_use]
pub fn example_dashboard() -> DashboardData {
    DashboardData {
        stats: DashboardStats {
            total_users: 1234,
            total_sales: 45231.0,
            total_products: 573,
            conversion_rate: 12.5,
            sales_growth: 15.1,
            users_growth: 20.1,
            products_growth: 2.1,
            conversion_growth: 3.2,
        },
        recent_sales: vec![
            sale("1", "João Silva", "joao@email.com", 1234.0, SaleStatus::Completed),
            sale("2", "Maria Santos", "maria@email.com", 2345.0, SaleStatus::Completed),
            sale("3", "Pedro Costa", "pedro@email.com", 987.0, SaleStatus::Pending),
            sale("4", "Ana Lima", "ana@email.com", 1567.0, SaleStatus::Completed),
        ],
        system_activities: vec![
            activity("1", "Novo usuário cadastrado", "João Silva se cadastrou", "2024-01-01T10:00:00Z", ActivityKind::User),
            activity("2", "Produto atualizado", "Produto X foi modificado", "2024-01-01T09:55:00Z", ActivityKind::Product),
            activity("3", "Venda realizada", "Venda #123 concluída", "2024-01-01T09:50:00Z", ActivityKind::Sale),
            activity("4", "Backup do sistema", "Backup automático executado", "2024-01-01T09:00:00Z", ActivityKind::System),
        ],
        sales_chart: Vec::new(),
        users_chart: Vec::new(),
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
