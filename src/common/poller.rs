//! 連番スナップショットの監視
//!
//! `<prefix>.<iteration>.<ext>` 形式のファイルを更新時刻順に並べ、
//! 最後に表示したファイルより後に並ぶ最初の1件を返す。位置ではなく
//! (更新時刻, 反復番号, パス) で覚えるので、ディレクトリを掃除して
//! 出力をやり直しても新しいファイルを拾える。書き込み途中の一時ファイル
//! (`<prefix>.tmp.<iteration>.<ext>`) は反復番号が数字でないため対象外。

use super::error::Result;
use super::snapshot::Snapshot;
use glam::Vec3;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 監視対象の候補ファイル
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub iteration: u64,
    pub modified: SystemTime,
}

impl SnapshotFile {
    /// 並び順のキー
    fn order_key(&self) -> (SystemTime, u64, &Path) {
        (self.modified, self.iteration, &self.path)
    }
}

/// 最後に表示したファイル
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastSeen {
    pub modified: SystemTime,
    pub iteration: u64,
    pub path: PathBuf,
}

impl LastSeen {
    fn order_key(&self) -> (SystemTime, u64, &Path) {
        (self.modified, self.iteration, &self.path)
    }
}

/// 1回のポーリング結果
#[derive(Debug)]
pub enum PollOutcome {
    NewData {
        path: PathBuf,
        iteration: u64,
        snapshot: Snapshot,
    },
    NoNewData,
}

/// 監視状態（最後に表示したファイルと、その位置データ）
#[derive(Debug)]
pub struct SnapshotPoller {
    dir: PathBuf,
    stem: String,
    ext: String,
    last_seen: Option<LastSeen>,
    last_positions: Option<Vec<Vec3>>,
}

impl SnapshotPoller {
    /// `prefix` はディレクトリを含んでもよい（例: `out/run` → `out/run.12.h5`）
    pub fn new(prefix: impl AsRef<Path>, ext: &str) -> Self {
        let prefix = prefix.as_ref();
        let dir = match prefix.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = prefix
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            dir,
            stem,
            ext: ext.trim_start_matches('.').to_string(),
            last_seen: None,
            last_positions: None,
        }
    }

    pub fn last_seen(&self) -> Option<&LastSeen> {
        self.last_seen.as_ref()
    }

    pub fn last_positions(&self) -> Option<&[Vec3]> {
        self.last_positions.as_deref()
    }

    /// ファイル名から反復番号を取り出す（形式が違えば None）
    pub fn parse_iteration(&self, file_name: &str) -> Option<u64> {
        let rest = file_name.strip_prefix(&self.stem)?.strip_prefix('.')?;
        let middle = rest.strip_suffix(&self.ext)?.strip_suffix('.')?;
        if middle.is_empty() || !middle.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        middle.parse().ok()
    }

    /// 候補ファイル一覧（更新時刻順、同時刻は反復番号順、さらにパス順）
    pub fn candidates(&self) -> Result<Vec<SnapshotFile>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(iteration) = self.parse_iteration(&name.to_string_lossy()) else {
                continue;
            };
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            files.push(SnapshotFile {
                path: entry.path(),
                iteration,
                modified: meta.modified()?,
            });
        }
        files.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
        Ok(files)
    }

    /// 最後に表示したファイルより後に並ぶ最初のファイルを読む
    ///
    /// 読み込みに失敗した場合は記録を進めないので、次回のポーリングで再試行される。
    pub fn poll(&mut self) -> Result<PollOutcome> {
        let files = self.candidates()?;
        let next = match &self.last_seen {
            None => files.first(),
            Some(seen) => files.iter().find(|f| f.order_key() > seen.order_key()),
        };
        let Some(file) = next else {
            return Ok(PollOutcome::NoNewData);
        };

        let snapshot = Snapshot::load(&file.path)?;
        log::info!(
            "読み込み: {} (反復 {}, {} 粒子)",
            file.path.display(),
            file.iteration,
            snapshot.len()
        );

        self.last_seen = Some(LastSeen {
            modified: file.modified,
            iteration: file.iteration,
            path: file.path.clone(),
        });
        self.last_positions = Some(snapshot.positions.clone());

        Ok(PollOutcome::NewData {
            path: file.path.clone(),
            iteration: file.iteration,
            snapshot,
        })
    }
}
