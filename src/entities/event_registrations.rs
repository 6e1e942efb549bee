use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "event_registrations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub event_id: i32,

    pub volunteer_id: i32,

    /// "confirmed", "cancelled", or "attended"
    pub status: String,

    pub notes: Option<String>,

    pub registered_at: String,

    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Events,
    #[sea_orm(
        belongs_to = "super::volunteers::Entity",
        from = "Column::VolunteerId",
        to = "super::volunteers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Volunteers,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl Related<super::volunteers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Volunteers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
