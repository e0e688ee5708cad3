use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Select};

use crate::entities;

/// Which side of `last_updated` to keep. Artists stamped exactly at the
/// instant are excluded either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastUpdatedBound {
    After(i64),
    Before(i64),
}

/// Sparse filter over artists; absent fields don't constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistQuery {
    /// Case-sensitive substring of the artist name
    pub name_contains: Option<String>,
    /// Microseconds since the Unix epoch
    pub last_updated: Option<LastUpdatedBound>,
}

impl ArtistQuery {
    /// Builds the select for this filter starting from a fresh `artists`
    /// query, so nothing carries over between calls.
    pub fn to_select(&self) -> Select<entities::artist::Entity> {
        let mut query = entities::artist::Entity::find();

        if let Some(name) = self.name_contains.as_deref()
            && !name.is_empty()
        {
            // LIKE is case-insensitive on SQLite
            query = query.filter(Expr::cust_with_values(
                r#"instr("artists"."name", ?) > 0"#,
                [name.to_string()],
            ));
        }

        query = match self.last_updated {
            Some(LastUpdatedBound::After(instant)) => {
                query.filter(entities::artist::Column::LastUpdated.gt(instant))
            }
            Some(LastUpdatedBound::Before(instant)) => {
                query.filter(entities::artist::Column::LastUpdated.lt(instant))
            }
            None => query,
        };

        query.order_by_asc(entities::artist::Column::Id)
    }
}
