use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create artists table
        manager
            .create_table(
                Table::create()
                    .table(Artist::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Artist::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Artist::Name).string().not_null())
                    // Final arbiter for concurrent create-if-absent calls
                    .col(
                        ColumnDef::new(Artist::SpotifyId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Artist::LastUpdated)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // Create albums table
        manager
            .create_table(
                Table::create()
                    .table(Album::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Album::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Album::Name).string().not_null())
                    // "album", "single", "compilation"; empty when unknown
                    .col(
                        ColumnDef::new(Album::AlbumType)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Album::SpotifyId).string())
                    .col(ColumnDef::new(Album::ReleaseDate).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Create artist_albums junction table
        manager
            .create_table(
                Table::create()
                    .table(ArtistAlbum::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ArtistAlbum::ArtistId).integer().not_null())
                    .col(ColumnDef::new(ArtistAlbum::AlbumId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ArtistAlbum::ArtistId)
                            .col(ArtistAlbum::AlbumId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artist_albums_artist_id")
                            .from(ArtistAlbum::Table, ArtistAlbum::ArtistId)
                            .to(Artist::Table, Artist::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artist_albums_album_id")
                            .from(ArtistAlbum::Table, ArtistAlbum::AlbumId)
                            .to(Album::Table, Album::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Images are owned by either an artist or an album, so owner_id has no foreign key
        manager
            .create_table(
                Table::create()
                    .table(Image::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Image::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Image::OwnerKind).string().not_null())
                    .col(ColumnDef::new(Image::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Image::Url).string().not_null())
                    .col(ColumnDef::new(Image::Width).integer().not_null())
                    .col(ColumnDef::new(Image::Height).integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create indexes
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_artists_last_updated")
                    .table(Artist::Table)
                    .col(Artist::LastUpdated)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_albums_spotify_id")
                    .table(Album::Table)
                    .col(Album::SpotifyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_images_owner")
                    .table(Image::Table)
                    .col(Image::OwnerKind)
                    .col(Image::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(Image::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ArtistAlbum::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Album::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Artist::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Artist {
    #[sea_orm(iden = "artists")]
    Table,
    Id,
    Name,
    SpotifyId,
    LastUpdated,
}

#[derive(DeriveIden)]
enum Album {
    #[sea_orm(iden = "albums")]
    Table,
    Id,
    Name,
    AlbumType,
    SpotifyId,
    ReleaseDate,
}

#[derive(DeriveIden)]
enum ArtistAlbum {
    #[sea_orm(iden = "artist_albums")]
    Table,
    ArtistId,
    AlbumId,
}

#[derive(DeriveIden)]
enum Image {
    #[sea_orm(iden = "images")]
    Table,
    Id,
    OwnerKind,
    OwnerId,
    Url,
    Width,
    Height,
}
