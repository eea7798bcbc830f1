use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Globally unique and immutable once issued.
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub qr_code: Option<String>,
    pub template: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub text_color: String,
    pub logo_url: Option<String>,
    pub show_logo: bool,
    pub show_qr_code: bool,
    pub show_expiry_date: bool,
    pub status: String,
    pub redemptions: i32,
    pub total_redemptions: Option<i32>,
    pub expiry_date: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
