use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "genre")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        super::venue_genre::Relation::Venue.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::venue_genre::Relation::Genre.def().rev())
    }
}

impl Related<super::artist::Entity> for Entity {
    fn to() -> RelationDef {
        super::artist_genre::Relation::Artist.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::artist_genre::Relation::Genre.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
