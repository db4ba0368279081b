//! Analytics Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::try_get_parsed,
    domain::{
        catalog::records::BusinessUuid,
        orders::models::{OrderTotals, PeriodSummary, RatingSummary, StatusCount, TopProduct},
    },
};

const ORDER_TOTALS_SQL: &str = include_str!("../sql/order_totals.sql");
const STATUS_BREAKDOWN_SQL: &str = include_str!("../sql/status_breakdown.sql");
const TOP_PRODUCTS_SQL: &str = include_str!("../sql/top_products.sql");
const RATING_SUMMARY_SQL: &str = include_str!("../sql/rating_summary.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAnalyticsRepository;

impl PgAnalyticsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn order_totals(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business: BusinessUuid,
    ) -> Result<OrderTotals, sqlx::Error> {
        query_as::<Postgres, OrderTotals>(ORDER_TOTALS_SQL)
            .bind(business.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn status_breakdown(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business: BusinessUuid,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        query_as::<Postgres, StatusCount>(STATUS_BREAKDOWN_SQL)
            .bind(business.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn top_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business: BusinessUuid,
    ) -> Result<Vec<TopProduct>, sqlx::Error> {
        query_as::<Postgres, TopProduct>(TOP_PRODUCTS_SQL)
            .bind(business.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Average and count over every rating of the business, public or private.
    pub(crate) async fn rating_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business: BusinessUuid,
    ) -> Result<RatingSummary, sqlx::Error> {
        query_as::<Postgres, RatingSummary>(RATING_SUMMARY_SQL)
            .bind(business.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

fn try_get_period(row: &PgRow, prefix: &str) -> Result<PeriodSummary, sqlx::Error> {
    Ok(PeriodSummary {
        orders: row.try_get(format!("{prefix}_orders").as_str())?,
        revenue: row.try_get(format!("{prefix}_revenue").as_str())?,
    })
}

impl<'r> FromRow<'r, PgRow> for OrderTotals {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            all_time: try_get_period(row, "total")?,
            today: try_get_period(row, "today")?,
            last_7_days: try_get_period(row, "last_7_days")?,
            last_30_days: try_get_period(row, "last_30_days")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for StatusCount {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            status: try_get_parsed(row, "status")?,
            orders: row.try_get("orders")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TopProduct {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_name: row.try_get("product_name")?,
            quantity_sold: row.try_get("quantity_sold")?,
            revenue: row.try_get("revenue")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for RatingSummary {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            average_rating: row.try_get("average_rating")?,
            total_ratings: row.try_get("total_ratings")?,
        })
    }
}
