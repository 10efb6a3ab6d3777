//! Scan, media, signature and history repository.

use domain::models::{History, Media, Scan, Signature};
use sqlx::PgPool;

use crate::entities::{
    HistoryTypeDb, MediaEntity, MediaTypeDb, ScanEntity, ScanStatusDb, ScanTypeDb,
    SignatureEntity,
};
use crate::metrics::QueryTimer;

/// Repository for checkpoint scans and uploaded attachments.
#[derive(Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    /// Creates a new AttachmentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn insert_scan(&self, scan: &Scan) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_scan");
        let result = sqlx::query(
            r#"
            INSERT INTO scans (scan_id, scan_type, checklist_id, scan_start_date, status,
                               created_by, created_date, modified_date, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&scan.scan_id)
        .bind(ScanTypeDb::from(scan.scan_type))
        .bind(&scan.checklist_id)
        .bind(scan.scan_start_date)
        .bind(ScanStatusDb::from(scan.status))
        .bind(&scan.created_by)
        .bind(scan.created_date)
        .bind(scan.modified_date)
        .bind(scan.is_active)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn list_scans(&self, checklist_id: &str) -> Result<Vec<ScanEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_scans");
        let result = sqlx::query_as::<_, ScanEntity>(
            r#"
            SELECT scan_id, scan_type, checklist_id, scan_start_date, status,
                   created_by, created_date, modified_date, is_active
            FROM scans
            WHERE checklist_id = $1
            ORDER BY created_date ASC, scan_id ASC
            "#,
        )
        .bind(checklist_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn insert_media(&self, media: &Media) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_media");
        let result = sqlx::query(
            r#"
            INSERT INTO media (multimedia_id, media_url, media_type, description, patrol_id,
                               checklist_id, created_by, modified_by, created_date, modified_date,
                               is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&media.multimedia_id)
        .bind(&media.media_url)
        .bind(MediaTypeDb::from(media.media_type))
        .bind(&media.description)
        .bind(&media.patrol_id)
        .bind(&media.checklist_id)
        .bind(&media.created_by)
        .bind(&media.modified_by)
        .bind(media.created_date)
        .bind(media.modified_date)
        .bind(media.is_active)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Media of a patrol. With `general_only`, rows linked to a checklist are skipped.
    pub async fn list_media(
        &self,
        patrol_id: &str,
        general_only: bool,
    ) -> Result<Vec<MediaEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_media");
        let result = sqlx::query_as::<_, MediaEntity>(
            r#"
            SELECT multimedia_id, media_url, media_type, description, patrol_id,
                   checklist_id, created_by, modified_by, created_date, modified_date, is_active
            FROM media
            WHERE patrol_id = $1 AND (NOT $2 OR checklist_id IS NULL)
            ORDER BY created_date ASC, multimedia_id ASC
            "#,
        )
        .bind(patrol_id)
        .bind(general_only)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn insert_signature(&self, signature: &Signature) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_signature");
        let result = sqlx::query(
            r#"
            INSERT INTO signatures (signature_id, signature_url, patrol_id, checklist_id,
                                    created_date, created_time, modified_date, modified_time,
                                    is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&signature.signature_id)
        .bind(&signature.signature_url)
        .bind(&signature.patrol_id)
        .bind(&signature.checklist_id)
        .bind(signature.created_date)
        .bind(&signature.created_time)
        .bind(signature.modified_date)
        .bind(&signature.modified_time)
        .bind(signature.is_active)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Signatures of a patrol. With `general_only`, rows linked to a checklist are skipped.
    pub async fn list_signatures(
        &self,
        patrol_id: &str,
        general_only: bool,
    ) -> Result<Vec<SignatureEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_signatures");
        let result = sqlx::query_as::<_, SignatureEntity>(
            r#"
            SELECT signature_id, signature_url, patrol_id, checklist_id, created_date,
                   created_time, modified_date, modified_time, is_active
            FROM signatures
            WHERE patrol_id = $1 AND (NOT $2 OR checklist_id IS NULL)
            ORDER BY created_date ASC, signature_id ASC
            "#,
        )
        .bind(patrol_id)
        .bind(general_only)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn insert_history(&self, history: &History) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_history");
        let result = sqlx::query(
            r#"
            INSERT INTO history (history_id, date, history_type, remarks, patrol_id, checklist_id,
                                 media_url, created_by, created_date, modified_date, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&history.history_id)
        .bind(history.date)
        .bind(HistoryTypeDb::from(history.history_type))
        .bind(&history.remarks)
        .bind(&history.patrol_id)
        .bind(&history.checklist_id)
        .bind(&history.media_url)
        .bind(&history.created_by)
        .bind(history.created_date)
        .bind(history.modified_date)
        .bind(history.is_active)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }
}
