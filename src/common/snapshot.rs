//! スナップショット（1反復分の粒子状態）の読み込み
//!
//! 対応形式:
//!   - CSV: 必須カラム `x, y, z, morton_key`、任意カラム `density, pressure, fpx, fpy, fpz`
//!   - HDF5 (`hdf5` フィーチャ): データセット `positions` (n x 3)、任意で `morton_keys` (n)

use super::error::{Error, Result};
use glam::{DVec3, Vec3};
use serde::Deserialize;
use std::path::Path;

/// CSV の必須カラム
pub const REQUIRED_COLUMNS: [&str; 4] = ["x", "y", "z", "morton_key"];

/// 1反復分の粒子データ（読み取り専用）
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub positions: Vec<Vec3>,
    pub keys: Option<Vec<u64>>,
    pub density: Option<Vec<f64>>,
    pub pressure: Option<Vec<f64>>,
    pub forces: Option<Vec<DVec3>>,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    x: f64,
    y: f64,
    z: f64,
    morton_key: u64,
    density: Option<f64>,
    pressure: Option<f64>,
    fpx: Option<f64>,
    fpy: Option<f64>,
    fpz: Option<f64>,
}

impl Snapshot {
    /// 拡張子に応じて読み込む
    ///
    /// 形式の判定が先なので、`hdf5` フィーチャなしの `.h5` はファイルの有無に
    /// かかわらず `UnsupportedFormat` になる。
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Self::load_csv(path),
            "h5" | "hdf5" => Self::load_h5(path),
            _ if !path.exists() => Err(Error::FileNotFound(path.to_path_buf())),
            _ => Err(Error::UnsupportedFormat(ext)),
        }
    }

    /// CSV ダンプを読み込む
    pub fn load_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

        let headers = reader.headers()?.clone();
        let has = |name: &str| headers.iter().any(|h| h == name);
        for name in REQUIRED_COLUMNS {
            if !has(name) {
                return Err(Error::MissingColumn(name.to_string()));
            }
        }

        let mut rows = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            rows.push(row?);
        }

        let positions = rows
            .iter()
            .map(|r| Vec3::new(r.x as f32, r.y as f32, r.z as f32))
            .collect();
        let keys = rows.iter().map(|r| r.morton_key).collect();

        let density = optional_column(&rows, has("density"), "density", |r| r.density)?;
        let pressure = optional_column(&rows, has("pressure"), "pressure", |r| r.pressure)?;
        let forces = if has("fpx") && has("fpy") && has("fpz") {
            let fx = optional_column(&rows, true, "fpx", |r| r.fpx)?.unwrap_or_default();
            let fy = optional_column(&rows, true, "fpy", |r| r.fpy)?.unwrap_or_default();
            let fz = optional_column(&rows, true, "fpz", |r| r.fpz)?.unwrap_or_default();
            Some(
                fx.into_iter()
                    .zip(fy)
                    .zip(fz)
                    .map(|((x, y), z)| DVec3::new(x, y, z))
                    .collect(),
            )
        } else {
            None
        };

        log::debug!("CSV 読み込み: {} ({} 粒子)", path.display(), rows.len());

        Ok(Self {
            positions,
            keys: Some(keys),
            density,
            pressure,
            forces,
        })
    }

    /// HDF5 スナップショットを読み込む
    #[cfg(feature = "hdf5")]
    pub fn load_h5(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        // ファイルはこのスコープを抜けると閉じられる
        let file = hdf5::File::open(path)?;

        if !file.link_exists("positions") {
            return Err(Error::MissingDataset("positions".to_string()));
        }
        let ds = file.dataset("positions")?;
        let shape = ds.shape();
        if shape.len() != 2 || shape[1] != 3 {
            return Err(Error::Malformed(format!(
                "positions の形状が (n, 3) ではありません: {:?}",
                shape
            )));
        }
        let raw: Vec<f64> = ds.read_raw()?;
        let positions = raw
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32))
            .collect::<Vec<_>>();

        let keys = if file.link_exists("morton_keys") {
            let raw: Vec<u32> = file.dataset("morton_keys")?.read_raw()?;
            if raw.len() != positions.len() {
                return Err(Error::Malformed(format!(
                    "morton_keys の長さ {} が粒子数 {} と一致しません",
                    raw.len(),
                    positions.len()
                )));
            }
            Some(raw.into_iter().map(u64::from).collect())
        } else {
            None
        };

        log::debug!("HDF5 読み込み: {} ({} 粒子)", path.display(), positions.len());

        Ok(Self {
            positions,
            keys,
            ..Self::default()
        })
    }

    #[cfg(not(feature = "hdf5"))]
    pub fn load_h5(path: &Path) -> Result<Self> {
        Err(Error::UnsupportedFormat(format!(
            "{} (HDF5 を読むには `hdf5` フィーチャを有効にしてビルドしてください)",
            path.display()
        )))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn max_key(&self) -> Option<u64> {
        self.keys.as_ref().and_then(|k| k.iter().copied().max())
    }

    /// 外力の大きさ |(fpx, fpy, fpz)|
    pub fn force_magnitude(&self) -> Option<Vec<f64>> {
        self.forces
            .as_ref()
            .map(|f| f.iter().map(|v| v.length()).collect())
    }

    /// 位置の軸並行バウンディングボックス (min, max)
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }
}

/// ヘッダがある任意カラムを取り出す（空欄があれば不正扱い）
fn optional_column<F>(rows: &[CsvRow], present: bool, name: &str, get: F) -> Result<Option<Vec<f64>>>
where
    F: Fn(&CsvRow) -> Option<f64>,
{
    if !present {
        return Ok(None);
    }
    rows.iter()
        .enumerate()
        .map(|(i, r)| {
            get(r).ok_or_else(|| Error::Malformed(format!("{} 行目の {} が空です", i + 2, name)))
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}



#[cfg(all(test, feature = "hdf5"))]
mod hdf5_tests {
    use super::*;
    use std::path::PathBuf;

    /// positions (rows x cols) と任意の morton_keys を持つファイルを作る
    fn write_h5(
        dir: &tempfile::TempDir,
        name: &str,
        positions: Option<(&[f64], usize, usize)>,
        keys: Option<&[u32]>,
    ) -> PathBuf {
        let path = dir.path().join(name);
        let file = hdf5::File::create(&path).unwrap();
        if let Some((data, rows, cols)) = positions {
            let ds = file
                .new_dataset::<f64>()
                .shape((rows, cols))
                .create("positions")
                .unwrap();
            ds.write_raw(data).unwrap();
        }
        if let Some(keys) = keys {
            let ds = file
                .new_dataset::<u32>()
                .shape(keys.len())
                .create("morton_keys")
                .unwrap();
            ds.write_raw(keys).unwrap();
        }
        path
    }

    #[test]
    fn test_load_positions_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let data = [0.0, 1.0, 2.0, -1.0, 0.5, 3.0];
        let path = write_h5(&dir, "sim.3.h5", Some((&data, 2, 3)), Some(&[9, 4]));

        let snap = Snapshot::load(&path).unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.positions[0], Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(snap.positions[1], Vec3::new(-1.0, 0.5, 3.0));
        assert_eq!(snap.keys.as_deref(), Some(&[9u64, 4][..]));
        assert!(snap.density.is_none());
        assert!(snap.forces.is_none());
    }

    #[test]
    fn test_keys_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_h5(&dir, "nokeys.h5", Some((&[1.0, 2.0, 3.0], 1, 3)), None);

        let snap = Snapshot::load_h5(&path).unwrap();
        assert_eq!(snap.len(), 1);
        assert!(snap.keys.is_none());
    }

    #[test]
    fn test_missing_positions_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_h5(&dir, "empty.h5", None, Some(&[1, 2]));

        match Snapshot::load(&path) {
            Err(Error::MissingDataset(name)) => assert_eq!(name, "positions"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_positions_must_be_n_by_3() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_h5(&dir, "flat.h5", Some((&[1.0, 2.0, 3.0, 4.0], 2, 2)), None);

        assert!(matches!(Snapshot::load(&path), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_key_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let data = [0.0; 6];
        let path = write_h5(&dir, "short.h5", Some((&data, 2, 3)), Some(&[1]));

        assert!(matches!(Snapshot::load(&path), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_missing_h5_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.h5");
        assert!(matches!(Snapshot::load(&missing), Err(Error::FileNotFound(_))));
    }
}
