//! SQLite-backed wardrobe storage.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::{WardrobeError, WardrobeResult};
use crate::item::{Category, NewItem, Season, WardrobeItem};

const ITEM_COLUMNS: &str = "id, name, image, category, color, season, favorite, created_at";

/// SQLite-based wardrobe storage.
pub struct WardrobeStore {
    conn: Connection,
}

impl WardrobeStore {
    /// Open (or create) the wardrobe database at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> WardrobeResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    WardrobeError::Storage(styleme_core::StorageError::ConnectionFailed(
                        e.to_string(),
                    ))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    #[cfg(test)]
    pub fn in_memory() -> WardrobeResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> WardrobeResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS wardrobe_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                image TEXT,
                category TEXT NOT NULL,
                color TEXT NOT NULL DEFAULT '',
                season TEXT NOT NULL DEFAULT 'All',
                favorite INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_wardrobe_category ON wardrobe_items(category);
            "#,
        )?;
        Ok(())
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<WardrobeItem> {
        let category: String = row.get(3)?;
        let season_str: String = row.get(5)?;
        let favorite: i32 = row.get(6)?;
        let created_at_str: String = row.get(7)?;

        let season = Season::parse(&season_str).unwrap_or_else(|| {
            tracing::warn!("Unknown season '{}' in wardrobe, treating as All", season_str);
            Season::All
        });
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(WardrobeItem {
            id: row.get(0)?,
            name: row.get(1)?,
            image: row.get(2)?,
            category: Category::from(category),
            color: row.get(4)?,
            season,
            favorite: favorite != 0,
            created_at,
        })
    }

    /// Add an item. New items are never favorites.
    pub fn add_item(&self, item: NewItem) -> WardrobeResult<WardrobeItem> {
        let name = item.name.trim();
        if name.is_empty() {
            return Err(WardrobeError::InvalidItem("name must not be empty".into()));
        }

        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO wardrobe_items (name, image, category, color, season, favorite, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            params![
                name,
                item.image,
                item.category.as_str(),
                item.color.trim(),
                item.season.as_str(),
                created_at.to_rfc3339(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, name, category = %item.category, "Wardrobe item added");
        self.get(id)?.ok_or(WardrobeError::NotFound(id))
    }

    pub fn get(&self, id: i64) -> WardrobeResult<Option<WardrobeItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM wardrobe_items WHERE id = ?1");
        let item = self
            .conn
            .query_row(&sql, params![id], Self::row_to_item)
            .optional()?;
        Ok(item)
    }

    /// Flip the favorite flag and return the new value.
    pub fn toggle_favorite(&self, id: i64) -> WardrobeResult<bool> {
        let changed = self.conn.execute(
            "UPDATE wardrobe_items SET favorite = 1 - favorite WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Err(WardrobeError::NotFound(id));
        }

        let favorite: i32 = self.conn.query_row(
            "SELECT favorite FROM wardrobe_items WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(favorite != 0)
    }

    /// All items in insertion order.
    pub fn items(&self) -> WardrobeResult<Vec<WardrobeItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM wardrobe_items ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map([], Self::row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn items_in_category(&self, category: &Category) -> WardrobeResult<Vec<WardrobeItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM wardrobe_items WHERE category = ?1 COLLATE NOCASE ORDER BY id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![category.as_str()], Self::row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn count(&self) -> WardrobeResult<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM wardrobe_items", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Populate an empty wardrobe with a starter set. Returns how many items
    /// were inserted (0 when the wardrobe already has items).
    pub fn seed_demo_items(&self) -> WardrobeResult<usize> {
        if self.count()? > 0 {
            return Ok(0);
        }

        let demo = [
            (NewItem::new("Navy Blazer", Category::Jackets).color("Navy"), true),
            (NewItem::new("White Button Shirt", Category::Tops).color("White"), false),
            (NewItem::new("Black Dress Pants", Category::Pants).color("Black"), true),
            (NewItem::new("Black Blazer", Category::Jackets).color("Black"), true),
            (NewItem::new("Blue Jeans", Category::Pants).color("Blue"), false),
            (
                NewItem::new("Summer Dress", Category::Dresses)
                    .color("Floral")
                    .season(Season::Summer),
                true,
            ),
        ];

        let tx = self.conn.unchecked_transaction()?;
        for (item, favorite) in &demo {
            tx.execute(
                "INSERT INTO wardrobe_items (name, image, category, color, season, favorite, created_at)
                 VALUES (?1, NULL, ?2, ?3, ?4, ?5, ?6)",
                params![
                    item.name,
                    item.category.as_str(),
                    item.color,
                    item.season.as_str(),
                    i32::from(*favorite),
                    Utc::now().to_rfc3339(),
                ],
            )?;
        }
        tx.commit()?;

        tracing::info!("Seeded wardrobe with {} demo items", demo.len());
        Ok(demo.len())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn create_test_store() -> WardrobeStore {
        WardrobeStore::in_memory().expect("Failed to create in-memory store")
    }

    #[test]
    fn test_add_and_get_item() {
        let store = create_test_store();
        let item = store
            .add_item(
                NewItem::new("Trench Coat", Category::Jackets)
                    .color("Beige")
                    .season(Season::Fall)
                    .image("photos/trench.jpg"),
            )
            .unwrap();

        assert!(item.id > 0);
        assert!(!item.favorite);

        let fetched = store.get(item.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Trench Coat");
        assert_eq!(fetched.category, Category::Jackets);
        assert_eq!(fetched.season, Season::Fall);
        assert_eq!(fetched.image.as_deref(), Some("photos/trench.jpg"));
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let store = create_test_store();
        let err = store
            .add_item(NewItem::new("   ", Category::Tops))
            .unwrap_err();
        assert!(matches!(err, WardrobeError::InvalidItem(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let store = create_test_store();
        let a = store.add_item(NewItem::new("Tee", Category::Tops)).unwrap();
        let b = store.add_item(NewItem::new("Tee", Category::Tops)).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_toggle_favorite() {
        let store = create_test_store();
        let item = store
            .add_item(NewItem::new("Silk Scarf", Category::Accessories))
            .unwrap();

        assert!(store.toggle_favorite(item.id).unwrap());
        assert!(store.get(item.id).unwrap().unwrap().favorite);
        assert!(!store.toggle_favorite(item.id).unwrap());
    }

    #[test]
    fn test_toggle_missing_item() {
        let store = create_test_store();
        assert!(matches!(
            store.toggle_favorite(404),
            Err(WardrobeError::NotFound(404))
        ));
    }

    #[test]
    fn test_items_in_category() {
        let store = create_test_store();
        store.add_item(NewItem::new("Loafers", Category::Shoes)).unwrap();
        store.add_item(NewItem::new("Sneakers", Category::Shoes)).unwrap();
        store.add_item(NewItem::new("Chinos", Category::Pants)).unwrap();
        store
            .add_item(NewItem::new("Cardigan", Category::Other("Knitwear".into())))
            .unwrap();

        let shoes = store.items_in_category(&Category::Shoes).unwrap();
        assert_eq!(shoes.len(), 2);
        assert_eq!(shoes[0].name, "Loafers");

        let knitwear = store
            .items_in_category(&Category::Other("knitwear".into()))
            .unwrap();
        assert_eq!(knitwear.len(), 1);
        assert_eq!(knitwear[0].category, Category::Other("Knitwear".into()));
    }

    #[test]
    fn test_seed_demo_items_only_once() {
        let store = create_test_store();
        assert_eq!(store.seed_demo_items().unwrap(), 6);
        assert_eq!(store.seed_demo_items().unwrap(), 0);

        let items = store.items().unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(items[0].name, "Navy Blazer");
        assert!(items[0].favorite);
        assert!(items
            .iter()
            .any(|i| i.name == "Summer Dress" && i.season == Season::Summer));
    }

    #[test]
    fn test_unknown_season_reads_as_all() {
        let store = create_test_store();
        let item = store.add_item(NewItem::new("Poncho", Category::Jackets)).unwrap();
        store
            .conn
            .execute(
                "UPDATE wardrobe_items SET season = 'Monsoon' WHERE id = ?1",
                params![item.id],
            )
            .unwrap();
        assert_eq!(store.get(item.id).unwrap().unwrap().season, Season::All);
    }
}
