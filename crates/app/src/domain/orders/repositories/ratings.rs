//! Ratings Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use nexus::ratings::{RatingScores, Stars};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    accounts::records::UserUuid,
    catalog::records::BusinessUuid,
    orders::{
        data::NewRating,
        records::{OrderRecord, OrderUuid, RatingRecord, RatingUuid},
    },
};

use super::column_error;

const INSERT_RATING_SQL: &str = include_str!("../sql/insert_rating.sql");
const GET_RATING_FOR_ORDER_SQL: &str = include_str!("../sql/get_rating_for_order.sql");
const LIST_RATINGS_SQL: &str = include_str!("../sql/list_ratings.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgRatingsRepository;

impl PgRatingsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Stores a verified rating against the order's customer and business.
    pub(crate) async fn insert_rating(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
        rating: NewRating,
    ) -> Result<RatingRecord, sqlx::Error> {
        query_as::<Postgres, RatingRecord>(INSERT_RATING_SQL)
            .bind(RatingUuid::new().into_uuid())
            .bind(order.uuid.into_uuid())
            .bind(order.customer_uuid.into_uuid())
            .bind(order.business_uuid.into_uuid())
            .bind(rating.scores.overall.as_i16())
            .bind(rating.scores.food_quality.map(Stars::as_i16))
            .bind(rating.scores.delivery_speed.map(Stars::as_i16))
            .bind(rating.scores.customer_service.map(Stars::as_i16))
            .bind(rating.review_text)
            .bind(rating.is_public)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_for_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<RatingRecord>, sqlx::Error> {
        query_as::<Postgres, RatingRecord>(GET_RATING_FOR_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Ratings left by `user`, or received by businesses `user` owns when `as_owner`.
    pub(crate) async fn list_ratings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        as_owner: bool,
    ) -> Result<Vec<RatingRecord>, sqlx::Error> {
        query_as::<Postgres, RatingRecord>(LIST_RATINGS_SQL)
            .bind(user.into_uuid())
            .bind(as_owner)
            .fetch_all(&mut **tx)
            .await
    }
}

fn try_get_stars(row: &PgRow, col: &str) -> Result<Stars, sqlx::Error> {
    let raw: i16 = row.try_get(col)?;

    Stars::try_from(raw).map_err(|e| column_error(col, e))
}

fn try_get_optional_stars(row: &PgRow, col: &str) -> Result<Option<Stars>, sqlx::Error> {
    row.try_get::<Option<i16>, _>(col)?
        .map(|raw| Stars::try_from(raw).map_err(|e| column_error(col, e)))
        .transpose()
}

impl<'r> FromRow<'r, PgRow> for RatingRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: RatingUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            customer_uuid: UserUuid::from_uuid(row.try_get("customer_uuid")?),
            business_uuid: BusinessUuid::from_uuid(row.try_get("business_uuid")?),
            scores: RatingScores {
                overall: try_get_stars(row, "overall_rating")?,
                food_quality: try_get_optional_stars(row, "food_quality")?,
                delivery_speed: try_get_optional_stars(row, "delivery_speed")?,
                customer_service: try_get_optional_stars(row, "customer_service")?,
            },
            review_text: row.try_get("review_text")?,
            is_public: row.try_get("is_public")?,
            is_verified: row.try_get("is_verified")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
