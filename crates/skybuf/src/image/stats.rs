//! Radial size estimates of a drawn profile.
//!
//! All three use pixel-center radii measured from a center (by default the
//! image's true center), computed in pixels and converted to world units with
//! the pixel scale. An image whose WCS is not a simple pixel scale (or that
//! has no WCS) cannot be measured.

use std::fmt;
use std::str::FromStr;

use super::{Access, Image};
use crate::bounds::PositionD;
use crate::error::{Error, Result};

/// Which second-moment radius to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadiusKind {
    /// `sqrt(T / 2)` where `T` is the trace of the moment matrix.
    Trace,
    /// `det(Q)^(1/4)`.
    #[default]
    Det,
    Both,
}

impl FromStr for RadiusKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "trace" => Ok(RadiusKind::Trace),
            "det" => Ok(RadiusKind::Det),
            "both" => Ok(RadiusKind::Both),
            other => Err(Error::InvalidValue(format!(
                "radius kind must be one of trace, det or both, got `{other}`"
            ))),
        }
    }
}

impl fmt::Display for RadiusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RadiusKind::Trace => "trace",
            RadiusKind::Det => "det",
            RadiusKind::Both => "both",
        })
    }
}

/// Result of [`Image::calculate_moment_radius`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MomentRadius {
    Trace(f64),
    Det(f64),
    Both { trace: f64, det: f64 },
}

impl MomentRadius {
    pub fn trace(&self) -> Option<f64> {
        match *self {
            MomentRadius::Trace(t) | MomentRadius::Both { trace: t, .. } => Some(t),
            MomentRadius::Det(_) => None,
        }
    }

    pub fn det(&self) -> Option<f64> {
        match *self {
            MomentRadius::Det(d) | MomentRadius::Both { det: d, .. } => Some(d),
            MomentRadius::Trace(_) => None,
        }
    }
}

/// One pixel measured from the center: offsets `dx`, `dy` and value.
struct Sample {
    dx: f64,
    dy: f64,
    value: f64,
}

impl Sample {
    fn rsq(&self) -> f64 {
        self.dx * self.dx + self.dy * self.dy
    }
}

impl<A: Access> Image<A> {
    fn pixel_scale(&self) -> Result<f64> {
        self.wcs
            .as_ref()
            .and_then(|w| w.scale())
            .ok_or(Error::NotPixelScale)
    }

    fn samples(&self, center: Option<PositionD>) -> Result<Vec<Sample>> {
        self.storage()?;
        let center = center.unwrap_or_else(|| self.true_center());
        let (nrow, ncol) = self.shape();
        let values = self.pixels();
        let x0 = self.xmin() as f64 - center.x;
        let y0 = self.ymin() as f64 - center.y;
        let mut out = Vec::with_capacity(values.len());
        for row in 0..nrow {
            for col in 0..ncol {
                out.push(Sample {
                    dx: col as f64 + x0,
                    dy: row as f64 + y0,
                    value: values[row * ncol + col],
                });
            }
        }
        Ok(out)
    }

    /// `(rsq, value)` pairs ordered by increasing radius.
    fn radial_profile(&self, center: Option<PositionD>) -> Result<Vec<(f64, f64)>> {
        let mut profile: Vec<(f64, f64)> = self
            .samples(center)?
            .iter()
            .map(|s| (s.rsq(), s.value))
            .collect();
        profile.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(profile)
    }

    /// Radius enclosing `flux_frac` of `flux` (default: the pixel sum).
    ///
    /// Walks the cumulative flux outward and interpolates `r^2` linearly
    /// between the pixels that bracket the target; when the first pixel
    /// already exceeds it, interpolates from the center.
    pub fn calculate_hlr(
        &self,
        center: Option<PositionD>,
        flux: Option<f64>,
        flux_frac: f64,
    ) -> Result<f64> {
        let scale = self.pixel_scale()?;
        let profile = self.radial_profile(center)?;
        let flux = flux.unwrap_or_else(|| profile.iter().map(|p| p.1).sum());
        let target = flux_frac * flux;

        let mut cumflux = Vec::with_capacity(profile.len());
        let mut running = 0.0;
        for &(_, v) in &profile {
            running += v;
            cumflux.push(running);
        }
        let k = cumflux.iter().position(|&c| c > target).unwrap_or(0);
        let fk = cumflux[k] / flux;
        let hlrsq = if k == 0 {
            profile[0].0 * (flux_frac / fk)
        } else {
            let fkm1 = cumflux[k - 1] / flux;
            (profile[k - 1].0 * (fk - flux_frac) + profile[k].0 * (flux_frac - fkm1)) / (fk - fkm1)
        };
        Ok(hlrsq.sqrt() * scale)
    }

    /// Unweighted second-moment radius of the pixel values, normalized by
    /// `flux` (default: the pixel sum).
    pub fn calculate_moment_radius(
        &self,
        center: Option<PositionD>,
        flux: Option<f64>,
        kind: RadiusKind,
    ) -> Result<MomentRadius> {
        let scale = self.pixel_scale()?;
        let samples = self.samples(center)?;
        let flux = flux.unwrap_or_else(|| samples.iter().map(|s| s.value).sum());

        let (mut ixx, mut iyy, mut ixy) = (0.0, 0.0, 0.0);
        for s in &samples {
            ixx += s.dx * s.dx * s.value;
            iyy += s.dy * s.dy * s.value;
            ixy += s.dx * s.dy * s.value;
        }
        let (ixx, iyy, ixy) = (ixx / flux, iyy / flux, ixy / flux);

        let trace = ((ixx + iyy) / 2.0).sqrt() * scale;
        let det = (ixx * iyy - ixy * ixy).powf(0.25) * scale;
        Ok(match kind {
            RadiusKind::Trace => MomentRadius::Trace(trace),
            RadiusKind::Det => MomentRadius::Det(det),
            RadiusKind::Both => MomentRadius::Both { trace, det },
        })
    }

    /// Full width at half maximum.
    ///
    /// `imax` is raised to the image maximum if that is larger. Finds the
    /// first pixel, outward from the center, below half of `imax` and
    /// interpolates `r^2` against the previous one.
    pub fn calculate_fwhm(&self, center: Option<PositionD>, imax: f64) -> Result<f64> {
        let scale = self.pixel_scale()?;
        let profile = self.radial_profile(center)?;
        let imax = profile.iter().map(|p| p.1).fold(imax, f64::max);
        let half = 0.5 * imax;

        let k = profile.iter().position(|p| p.1 < half).unwrap_or(0);
        let ik = profile[k].1 / imax;
        let rsqhm = if k == 0 {
            profile[0].0 * (0.5 / ik)
        } else {
            let ikm1 = profile[k - 1].1 / imax;
            (profile[k - 1].0 * (ik - 0.5) + profile[k].0 * (0.5 - ikm1)) / (ik - ikm1)
        };
        Ok(2.0 * rsqhm.sqrt() * scale)
    }
}
