//! PostgreSQL-backed ledger store.
//!
//! Production implementation of [`LedgerStore`] over a `sqlx` connection
//! pool. Isolation levels are applied with `SET TRANSACTION` as the
//! first statement of every transaction; all queries use runtime binds
//! so no database is needed at compile time.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::{AccountKind, Bank, BankAccount, Card, Credit, User};
use crate::domain::value_objects::{BankAccountId, BankId, CardId, CreditId, Money, UserId};
use crate::infrastructure::config::{ConnectionSettings, DbmsKind};
use crate::infrastructure::ledger_store::{IsolationLevel, LedgerStore, LedgerTx, StoreError};

/// PostgreSQL [`LedgerStore`] implementation.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Wraps an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] when the settings select a
    /// DBMS other than PostgreSQL or the pool cannot be established.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, StoreError> {
        if settings.dbms != DbmsKind::PostgreSql {
            return Err(StoreError::Connection(format!(
                "PgLedgerStore requires PostgreSQL settings, got {}",
                settings.dbms
            )));
        }

        let pool = PgPool::connect(&settings.connection_url())
            .await
            .map_err(|error| StoreError::Connection(error.to_string()))?;

        Ok(Self { pool })
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|error| StoreError::Database(error.to_string()))
    }

    /// Returns a reference to the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self, isolation: IsolationLevel) -> Result<Box<dyn LedgerTx>, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(isolation.set_statement())
            .execute(&mut *tx)
            .await?;
        Ok(Box::new(PgLedgerTx { tx }))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        fetch_user(&self.pool, id).await
    }

    async fn find_card_by_user(&self, user_id: UserId) -> Result<Option<Card>, StoreError> {
        fetch_card_by_user(&self.pool, user_id).await
    }

    async fn find_bank_account(
        &self,
        id: BankAccountId,
    ) -> Result<Option<BankAccount>, StoreError> {
        fetch_bank_account(&self.pool, id).await
    }

    async fn find_bank(&self, id: BankId) -> Result<Option<Bank>, StoreError> {
        fetch_bank(&self.pool, id).await
    }

    async fn find_credit_by_user(&self, user_id: UserId) -> Result<Option<Credit>, StoreError> {
        fetch_credit_by_user(&self.pool, user_id).await
    }

    async fn bank_account_exists(&self, id: BankAccountId) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM bank_accounts WHERE id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        fetch_user(&mut *self.tx, id).await
    }

    async fn find_card_by_user(&mut self, user_id: UserId) -> Result<Option<Card>, StoreError> {
        fetch_card_by_user(&mut *self.tx, user_id).await
    }

    async fn find_bank_account(
        &mut self,
        id: BankAccountId,
    ) -> Result<Option<BankAccount>, StoreError> {
        fetch_bank_account(&mut *self.tx, id).await
    }

    async fn find_bank_account_by_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<BankAccount>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, user_id, bank_id, balance, kind FROM bank_accounts WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(account_from_row).transpose()
    }

    async fn find_bank(&mut self, id: BankId) -> Result<Option<Bank>, StoreError> {
        fetch_bank(&mut *self.tx, id).await
    }

    async fn find_credit(&mut self, id: CreditId) -> Result<Option<Credit>, StoreError> {
        let row: Option<CreditRow> = sqlx::query_as(
            "SELECT id, user_id, bank_id, principal, interest_rate, issued_on, due_on, outstanding \
             FROM credits WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(credit_from_row))
    }

    async fn find_credit_by_user(&mut self, user_id: UserId) -> Result<Option<Credit>, StoreError> {
        fetch_credit_by_user(&mut *self.tx, user_id).await
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, age, password_hash) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(i16::from(user.age))
        .bind(&user.password_hash)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_card(&mut self, card: &Card) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO cards (id, user_id, bank_account_id, amount) VALUES ($1, $2, $3, $4)",
        )
        .bind(card.id.as_uuid())
        .bind(card.user_id.as_uuid())
        .bind(card.bank_account_id.as_uuid())
        .bind(card.amount.amount())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_bank_account(&mut self, account: &BankAccount) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO bank_accounts (id, user_id, bank_id, balance, kind) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(account.id.as_uuid())
        .bind(account.user_id.as_uuid())
        .bind(account.bank_id.as_uuid())
        .bind(account.balance.amount())
        .bind(kind_to_str(account.kind))
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_bank(&mut self, bank: &Bank) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO banks (id, name, reserve) VALUES ($1, $2, $3)")
            .bind(bank.id.as_uuid())
            .bind(&bank.name)
            .bind(bank.reserve.amount())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_credit(&mut self, credit: &Credit) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO credits \
             (id, user_id, bank_id, principal, interest_rate, issued_on, due_on, outstanding) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(credit.id.as_uuid())
        .bind(credit.user_id.as_uuid())
        .bind(credit.bank_id.as_uuid())
        .bind(credit.principal.amount())
        .bind(credit.interest_rate)
        .bind(credit.issued_on)
        .bind(credit.due_on)
        .bind(credit.outstanding.amount())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_balances(
        &mut self,
        account: &BankAccount,
        card: &Card,
        bank: Option<&Bank>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE bank_accounts SET balance = $2 WHERE id = $1")
            .bind(account.id.as_uuid())
            .bind(account.balance.amount())
            .execute(&mut *self.tx)
            .await?;
        sqlx::query("UPDATE cards SET amount = $2 WHERE id = $1")
            .bind(card.id.as_uuid())
            .bind(card.amount.amount())
            .execute(&mut *self.tx)
            .await?;
        if let Some(bank) = bank {
            sqlx::query("UPDATE banks SET reserve = $2 WHERE id = $1")
                .bind(bank.id.as_uuid())
                .bind(bank.reserve.amount())
                .execute(&mut *self.tx)
                .await?;
        }
        Ok(())
    }

    async fn update_credit(&mut self, credit: &Credit) -> Result<(), StoreError> {
        sqlx::query("UPDATE credits SET outstanding = $2 WHERE id = $1")
            .bind(credit.id.as_uuid())
            .bind(credit.outstanding.amount())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn remove_user(&mut self, id: UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn remove_card(&mut self, id: CardId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn remove_bank_account(&mut self, id: BankAccountId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM bank_accounts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn remove_credit(&mut self, id: CreditId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM credits WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

type UserRow = (Uuid, String, String, i16, String);
type CardRow = (Uuid, Uuid, Uuid, Decimal);
type AccountRow = (Uuid, Uuid, Uuid, Decimal, String);
type BankRow = (Uuid, String, Decimal);
type CreditRow = (
    Uuid,
    Uuid,
    Uuid,
    Decimal,
    Decimal,
    chrono::NaiveDate,
    chrono::NaiveDate,
    Decimal,
);

async fn fetch_user<'e, E>(executor: E, id: UserId) -> Result<Option<User>, StoreError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let row: Option<UserRow> =
        sqlx::query_as("SELECT id, name, email, age, password_hash FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(executor)
            .await?;
    row.map(user_from_row).transpose()
}

async fn fetch_card_by_user<'e, E>(executor: E, user_id: UserId) -> Result<Option<Card>, StoreError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let row: Option<CardRow> =
        sqlx::query_as("SELECT id, user_id, bank_account_id, amount FROM cards WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(executor)
            .await?;
    Ok(row.map(card_from_row))
}

async fn fetch_bank_account<'e, E>(
    executor: E,
    id: BankAccountId,
) -> Result<Option<BankAccount>, StoreError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let row: Option<AccountRow> = sqlx::query_as(
        "SELECT id, user_id, bank_id, balance, kind FROM bank_accounts WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(executor)
    .await?;
    row.map(account_from_row).transpose()
}

async fn fetch_bank<'e, E>(executor: E, id: BankId) -> Result<Option<Bank>, StoreError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let row: Option<BankRow> = sqlx::query_as("SELECT id, name, reserve FROM banks WHERE id = $1")
        .bind(id.as_uuid())
        .fetch_optional(executor)
        .await?;
    Ok(row.map(bank_from_row))
}

async fn fetch_credit_by_user<'e, E>(
    executor: E,
    user_id: UserId,
) -> Result<Option<Credit>, StoreError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let row: Option<CreditRow> = sqlx::query_as(
        "SELECT id, user_id, bank_id, principal, interest_rate, issued_on, due_on, outstanding \
         FROM credits WHERE user_id = $1",
    )
    .bind(user_id.as_uuid())
    .fetch_optional(executor)
    .await?;
    Ok(row.map(credit_from_row))
}

fn user_from_row((id, name, email, age, password_hash): UserRow) -> Result<User, StoreError> {
    let age = u8::try_from(age)
        .map_err(|_| StoreError::Database(format!("user age out of range: {age}")))?;
    Ok(User {
        id: UserId::from_uuid(id),
        name,
        email,
        age,
        password_hash,
    })
}

fn card_from_row((id, user_id, bank_account_id, amount): CardRow) -> Card {
    Card {
        id: CardId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        bank_account_id: BankAccountId::from_uuid(bank_account_id),
        amount: Money::from(amount),
    }
}

fn account_from_row(
    (id, user_id, bank_id, balance, kind): AccountRow,
) -> Result<BankAccount, StoreError> {
    Ok(BankAccount {
        id: BankAccountId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        bank_id: BankId::from_uuid(bank_id),
        balance: Money::from(balance),
        kind: kind_from_str(&kind)?,
    })
}

fn bank_from_row((id, name, reserve): BankRow) -> Bank {
    Bank {
        id: BankId::from_uuid(id),
        name,
        reserve: Money::from(reserve),
    }
}

fn credit_from_row(
    (id, user_id, bank_id, principal, interest_rate, issued_on, due_on, outstanding): CreditRow,
) -> Credit {
    Credit {
        id: CreditId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        bank_id: BankId::from_uuid(bank_id),
        principal: Money::from(principal),
        interest_rate,
        issued_on,
        due_on,
        outstanding: Money::from(outstanding),
    }
}

const fn kind_to_str(kind: AccountKind) -> &'static str {
    match kind {
        AccountKind::Customer => "customer",
        AccountKind::Reserve => "reserve",
    }
}

fn kind_from_str(kind: &str) -> Result<AccountKind, StoreError> {
    match kind {
        "customer" => Ok(AccountKind::Customer),
        "reserve" => Ok(AccountKind::Reserve),
        other => Err(StoreError::Database(format!(
            "unknown account kind: {other}"
        ))),
    }
}
