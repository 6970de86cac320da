use super::*;
use crate::Config;
use crate::imagery::Catalog;
use crate::imagery::Panorama;
use const_format::concatcp;

/// Read interface for the panoramas of one municipality at one grid resolution.
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    async fn panoramas(&self, municipality: &str, resolution: &str) -> Result<Vec<Panorama>, Failure>;
}

/// The column list shared by every resolution; the unit column is spliced
/// in between `g.density` and the geometry at query time.
#[rustfmt::skip]
const HEAD: &str = concatcp!(
    "SELECT p.panoid::TEXT, ",
           "p.year::INT4, ",
           "p.month::INT4, ",
           "p.im_front::TEXT, ",
           "p.im_side_a::TEXT, ",
           "p.im_back::TEXT, ",
           "p.im_side_b::TEXT, ",
           "g.density::FLOAT8, ",
           "g.unit::TEXT, ",
           "ST_AsText(p.geometry)::TEXT ",
    "FROM   ", PANOIDS, " p ",
    "JOIN   (SELECT panoid, density, "
);

#[rustfmt::skip]
const TAIL: &str = concatcp!(
    "::TEXT AS unit ",
            "FROM   ", GEODATA, " ",
            "WHERE  gm_naam = $1) g ",
    "ON     p.panoid = g.panoid ",
    "WHERE  p.zone = $2 ",
    "ORDER  BY g.unit, p.panoid"
);

/// Full query for one resolution column.
///
/// The resolution names a column and cannot be a bind parameter, so it
/// must have passed [`Config::is_resolution`] first.
pub fn query(resolution: &str) -> Result<String, Failure> {
    match Config::is_resolution(resolution) {
        true => Ok(format!("{}{}{}", HEAD, resolution, TAIL)),
        false => Err(Failure::Config(format!("bad resolution column {:?}", resolution))),
    }
}

#[async_trait::async_trait]
impl Source for Client {
    async fn panoramas(&self, municipality: &str, resolution: &str) -> Result<Vec<Panorama>, Failure> {
        let ref sql = query(resolution)?;
        let ref zone = format!("{}_NL", municipality);
        Ok(self
            .query(sql.as_str(), &[&municipality, zone])
            .await?
            .into_iter()
            .map(|row| Panorama {
                panoid: row.get::<_, String>(0),
                year: row.get::<_, Option<i32>>(1),
                month: row.get::<_, Option<i32>>(2),
                front: row.get::<_, Option<String>>(3),
                left: row.get::<_, Option<String>>(4),
                back: row.get::<_, Option<String>>(5),
                right: row.get::<_, Option<String>>(6),
                density: row.get::<_, Option<f64>>(7),
                unit: row.get::<_, String>(8),
                geometry: row.get::<_, Option<String>>(9),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl Source for Arc<Client> {
    async fn panoramas(&self, municipality: &str, resolution: &str) -> Result<Vec<Panorama>, Failure> {
        self.as_ref().panoramas(municipality, resolution).await
    }
}

#[async_trait::async_trait]
impl Source for Catalog {
    async fn panoramas(&self, municipality: &str, resolution: &str) -> Result<Vec<Panorama>, Failure> {
        log::info!("{:<32}{} ({} {})", "reading catalog", self.path().display(), municipality, resolution);
        let catalog = self.clone();
        tokio::task::spawn_blocking(move || catalog.load())
            .await
            .map_err(|e| Failure::Catalog {
                path: self.path().to_path_buf(),
                reason: e.to_string(),
            })?
    }
}
