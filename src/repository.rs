use std::marker::PhantomData;

use sea_orm::{ActiveModelTrait, EntityTrait, PrimaryKeyTrait, Select};

use crate::db::Store;
use crate::error::StoreError;

/// A value either not yet written to the store or already holding its id.
#[derive(Clone, Debug, PartialEq)]
pub enum Record<T> {
    New(T),
    Persisted { id: i32, data: T },
}

impl<T> Record<T> {
    pub fn id(&self) -> Option<i32> {
        match self {
            Self::New(_) => None,
            Self::Persisted { id, .. } => Some(*id),
        }
    }

    pub fn data(&self) -> &T {
        match self {
            Self::New(data) | Self::Persisted { data, .. } => data,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            Self::New(data) | Self::Persisted { data, .. } => data,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted { .. })
    }
}

/// Field mapping between a domain record and its table.
pub trait Document: Sized {
    type Entity: EntityTrait;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + Send;

    fn to_active_model(&self) -> Self::ActiveModel;

    /// Splits a loaded row into its id and the domain value.
    fn from_model(model: <Self::Entity as EntityTrait>::Model) -> (i32, Self);
}

/// Create/read access to one table. Entity specific queries live in
/// inherent `impl Repository<X>` blocks next to each model.
pub struct Repository<D> {
    store: Store,
    _doc: PhantomData<fn() -> D>,
}

impl<D> Clone for Repository<D> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<D> Repository<D> {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            _doc: PhantomData,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

/// Rows per multi-row INSERT, keeps bound parameters under SQLite's limit.
const INSERT_CHUNK: usize = 100;

impl<D> Repository<D>
where
    D: Document,
    <D::Entity as EntityTrait>::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
{
    /// Writes a new record; persisted records are returned untouched.
    pub async fn save(&self, record: Record<D>) -> Result<Record<D>, StoreError> {
        match record {
            Record::New(data) => {
                let id = self.insert(&data).await?;
                Ok(Record::Persisted { id, data })
            }
            persisted @ Record::Persisted { .. } => Ok(persisted),
        }
    }

    pub async fn insert(&self, data: &D) -> Result<i32, StoreError> {
        let db = self.store.conn()?;
        let result = <D::Entity as EntityTrait>::insert(data.to_active_model()).exec(db).await?;
        Ok(result.last_insert_id)
    }

    pub async fn insert_many(&self, docs: &[D]) -> Result<usize, StoreError> {
        let db = self.store.conn()?;
        for chunk in docs.chunks(INSERT_CHUNK) {
            <D::Entity as EntityTrait>::insert_many(chunk.iter().map(|doc| doc.to_active_model()))
                .exec(db)
                .await?;
        }
        Ok(docs.len())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Record<D>>, StoreError> {
        self.fetch_one(<D::Entity as EntityTrait>::find_by_id(id)).await
    }

    pub async fn fetch_one(&self, select: Select<D::Entity>) -> Result<Option<Record<D>>, StoreError> {
        let db = self.store.conn()?;
        let model = select.one(db).await?;
        Ok(model.map(persisted))
    }

    pub async fn fetch_all(&self, select: Select<D::Entity>) -> Result<Vec<Record<D>>, StoreError> {
        let db = self.store.conn()?;
        let models = select.all(db).await?;
        Ok(models.into_iter().map(persisted).collect())
    }

    /// Removes every row; used by the importer before a full reload.
    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let db = self.store.conn()?;
        let result = <D::Entity as EntityTrait>::delete_many().exec(db).await?;
        Ok(result.rows_affected)
    }
}

fn persisted<D: Document>(model: <D::Entity as EntityTrait>::Model) -> Record<D> {
    let (id, data) = D::from_model(model);
    Record::Persisted { id, data }
}
