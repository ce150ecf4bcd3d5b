use crate::{
    QproxError, fXX,
    base::{
        Gridded, Histogram, HistogramMode, Quantiles, Representation, RepresentationKind,
        RepresentationStore, Samples,
    },
    math::{Interpolant, QuadratureSettings, Scheme, integrate, linspace, maxf, minf, powi, sqrt},
    methods::{GaussianMixtureEm, MixtureFitter},
    stats::{Capability, ContinuousDistribution, GaussianKde, Limits, SampleReconstruction},
};
use derive_builder::Builder;
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt::Arguments, sync::Arc};

/// Settings of a [`Pdf`].
#[derive(Builder, Clone, Debug, Deserialize, Serialize)]
pub struct PdfSettings<T>
where
    T: fXX,
{
    /// Number of grid points used to invert the cumulative integral of an interpolant.
    #[builder(default = 1000)]
    pub cdf_resolution: usize,

    /// Number of bins when a histogram is derived implicitly.
    #[builder(default = 10)]
    pub default_bins: usize,

    /// Number of quantiles when quantiles are derived implicitly.
    #[builder(default = 10)]
    pub default_quantiles: usize,

    /// Number of samples drawn for a mixture model fit, if none are stored.
    #[builder(default = 1000)]
    pub default_samples: usize,

    /// How histograms are turned into an evaluable density.
    #[builder(default)]
    pub histogram_mode: HistogramMode,

    /// Number of evenly spaced points spanning the limits on which samples are reconstructed.
    #[builder(default = 100)]
    pub kde_resolution: usize,

    /// Adaptive quadrature settings.
    #[builder(default)]
    pub quadrature: QuadratureSettings<T>,

    /// The initial interpolation scheme.
    #[builder(default)]
    pub scheme: Scheme,

    /// Echo operations at the `info` instead of the `debug` log level.
    #[builder(default = false)]
    pub verbose: bool,
}

impl<T> Default for PdfSettings<T>
where
    T: fXX,
{
    fn default() -> Self {
        Self {
            cdf_resolution: 1000,
            default_bins: 10,
            default_quantiles: 10,
            default_samples: 1000,
            histogram_mode: HistogramMode::default(),
            kde_resolution: 100,
            quadrature: QuadratureSettings::default(),
            scheme: Scheme::default(),
            verbose: false,
        }
    }
}

impl<T> PdfSettings<T>
where
    T: fXX,
{
    /// Checks the settings for consistency.
    pub fn validate(&self) -> Result<(), QproxError> {
        if (self.cdf_resolution < 2) || (self.kde_resolution < 2) {
            return Err(QproxError::Settings(format!(
                "cdf_resolution={} and kde_resolution={} must be at least 2",
                self.cdf_resolution, self.kde_resolution
            )));
        }

        if (self.default_bins == 0) || (self.default_quantiles == 0) || (self.default_samples == 0)
        {
            return Err(QproxError::Settings(String::from(
                "default bin, quantile and sample counts must be positive",
            )));
        }

        if !(self.quadrature.tolerance > T::zero()) {
            return Err(QproxError::Settings(format!(
                "quadrature tolerance={} must be positive",
                self.quadrature.tolerance
            )));
        }

        Ok(())
    }
}

/// A one-dimensional probability density function.
///
/// A [`Pdf`] is seeded with exactly one [`Representation`] and finite [`Limits`]. Quantiles and
/// histograms are derived on demand (from the truth or a mixture fit if available, otherwise from
/// the seed) and cached in a [`RepresentationStore`]. Every non-capability representation is
/// evaluated through an [`Interpolant`] built with the active [`Scheme`].
///
/// ```
/// # use qprox::{base::{Pdf, RepresentationKind}, stats::Limits};
/// let limits = Limits::<f64>::new((-1.0, 3.0)).unwrap();
/// let mut pdf = Pdf::from_histogram(vec![0.0, 1.0, 2.0], vec![0.25, 0.75], limits).unwrap();
///
/// let (_, values) = pdf.evaluate(&[1.5], RepresentationKind::Histogram, false).unwrap();
/// assert!((values[0] - 0.75).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct Pdf<T>
where
    T: fXX,
{
    cache: Option<InterpolantCache<T>>,
    limits: Limits<T>,
    reconstruction: Arc<dyn SampleReconstruction<T>>,
    settings: PdfSettings<T>,
    store: RepresentationStore<T>,
}

#[derive(Clone, Debug)]
struct InterpolantCache<T> {
    interpolant: Interpolant<T>,
    key: CacheKey,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CacheKey {
    kind: RepresentationKind,
    mode: HistogramMode,
    revision: u64,
    scheme: Scheme,
}

impl<T> Pdf<T>
where
    T: fXX,
{
    /// Evaluates the density at `points` after switching to `scheme`, if given.
    ///
    /// The scheme change persists for all further operations.
    pub fn approximate(
        &mut self,
        points: &[T],
        using: RepresentationKind,
        scheme: Option<Scheme>,
    ) -> Result<(Vec<T>, Vec<T>), QproxError> {
        if let Some(scheme) = scheme {
            self.set_scheme(scheme);
        }

        self.evaluate(points, using, false)
    }

    /// Builds a fresh [`Interpolant`] of the representation `using` with the given `scheme`.
    ///
    /// Absent quantiles or histograms are derived on the fly without being cached.
    pub fn build_interpolant(
        &self,
        using: RepresentationKind,
        scheme: Scheme,
    ) -> Result<Interpolant<T>, QproxError> {
        match self.store.representation(using) {
            Some(representation) => self.interpolant_of(representation, scheme),
            None => match using {
                RepresentationKind::Quantiles => {
                    let (quantiles, _) =
                        self.compute_quantiles(self.settings.default_quantiles, self.limits)?;

                    self.interpolant_of(&Representation::Quantiles(quantiles), scheme)
                }
                RepresentationKind::Histogram => {
                    let (histogram, _) =
                        self.compute_histogram(self.settings.default_bins, self.limits)?;

                    self.interpolant_of(&Representation::Histogram(histogram), scheme)
                }
                _ => Err(unavailable("Pdf::build_interpolant", using)),
            },
        }
    }

    /// Returns the part of `limits` on which the representation `using` can be evaluated.
    ///
    /// Capabilities and [`Scheme::Nearest`] interpolants cover any limits, other interpolants only
    /// their control point range.
    pub fn coverage(
        &self,
        using: RepresentationKind,
        limits: &Limits<T>,
    ) -> Result<Limits<T>, QproxError> {
        if using.is_capability() {
            self.capability_of(using, "Pdf::coverage")?;

            return Ok(*limits);
        }

        self.with_interpolant(using, |interpolant| Limits::new(support(interpolant, limits)?))
    }

    /// Evaluates the density of the representation `using` at `points` without modifying any
    /// cached state.
    pub fn density(&self, points: &[T], using: RepresentationKind) -> Result<Vec<T>, QproxError> {
        if using.is_capability() {
            let capability = self.capability_of(using, "Pdf::density")?;

            return Ok(points.iter().map(|x| capability.density(*x)).collect());
        }

        self.with_interpolant(using, |interpolant| interpolant.evaluate_many(points))
    }

    /// Returns the representation used when none is named explicitly: the truth if present, else
    /// the most recently used representation, else the seed.
    pub fn designated_kind(&self) -> RepresentationKind {
        if self.store.contains(RepresentationKind::Truth) {
            RepresentationKind::Truth
        } else {
            self.store.last_used().unwrap_or(self.store.seed())
        }
    }

    /// Evaluates the density of the representation `using` at `points`.
    ///
    /// Returns the evaluation points together with the values. With `norm`, the values are divided
    /// by the integral of the density over the limits.
    pub fn evaluate(
        &mut self,
        points: &[T],
        using: RepresentationKind,
        norm: bool,
    ) -> Result<(Vec<T>, Vec<T>), QproxError> {
        let values = if using.is_capability() {
            let capability = self.capability_of(using, "Pdf::evaluate")?;
            let values = points
                .iter()
                .map(|x| capability.density(*x))
                .collect::<Vec<T>>();

            if norm {
                let (lo, hi) = self.limits.tuple();

                normalize(
                    values,
                    integrate(
                        |x| Ok(capability.density(x)),
                        lo,
                        hi,
                        &self.settings.quadrature,
                    )?,
                )?
            } else {
                values
            }
        } else {
            let limits = self.limits;
            let interpolant = self.interpolant(using)?;
            let values = interpolant.evaluate_many(points)?;

            if norm {
                let (lo, hi) = support(interpolant, &limits)?;

                normalize(values, interpolant.integrate(lo, hi)?)?
            } else {
                values
            }
        };

        self.store.mark_used(using);

        self.echo(format_args!(
            "pdf_evaluate\n\tusing = {:?}\n\tpoints = {}\n\tnorm = {}",
            using,
            points.len(),
            norm
        ));

        Ok((points.to_vec(), values))
    }

    /// Create a new [`Pdf`] seeded with a truth [`Capability`].
    pub fn from_capability(
        capability: Capability<T>,
        limits: Limits<T>,
    ) -> Result<Self, QproxError> {
        Self::new(Representation::Truth(capability), limits)
    }

    /// Create a new [`Pdf`] seeded with a density evaluated on a grid.
    pub fn from_gridded(xs: Vec<T>, ys: Vec<T>, limits: Limits<T>) -> Result<Self, QproxError> {
        Self::new(Representation::Gridded(Gridded::new(xs, ys)?), limits)
    }

    /// Create a new [`Pdf`] seeded with a histogram.
    pub fn from_histogram(
        edges: Vec<T>,
        values: Vec<T>,
        limits: Limits<T>,
    ) -> Result<Self, QproxError> {
        Self::new(Representation::Histogram(Histogram::new(edges, values)?), limits)
    }

    /// Create a new [`Pdf`] seeded with quantiles.
    pub fn from_quantiles(
        levels: Vec<T>,
        values: Vec<T>,
        limits: Limits<T>,
    ) -> Result<Self, QproxError> {
        Self::new(Representation::Quantiles(Quantiles::new(levels, values)?), limits)
    }

    /// Create a new [`Pdf`] seeded with samples.
    pub fn from_samples(samples: Vec<T>, limits: Limits<T>) -> Result<Self, QproxError> {
        Self::new(Representation::Samples(Samples::new(samples)?), limits)
    }

    /// Returns the stored gridded representation.
    pub fn grid(&self) -> Option<&Gridded<T>> {
        self.store
            .representation(RepresentationKind::Gridded)
            .and_then(Representation::as_gridded)
    }

    /// Evaluates the representation `using` at `points` and stores the result as the [`Gridded`]
    /// representation.
    pub fn gridded(
        &mut self,
        points: &[T],
        using: RepresentationKind,
    ) -> Result<&Gridded<T>, QproxError> {
        let (xs, ys) = self.evaluate(points, using, false)?;

        self.store.mark_used(RepresentationKind::Gridded);

        let entry = self
            .store
            .insert(Representation::Gridded(Gridded::new(xs, ys)?), using)?;

        entry
            .representation
            .as_gridded()
            .ok_or_else(|| unavailable("Pdf::gridded", RepresentationKind::Gridded))
    }

    /// Returns the stored histogram.
    pub fn histogram(&self) -> Option<&Histogram<T>> {
        self.store
            .representation(RepresentationKind::Histogram)
            .and_then(Representation::as_histogram)
    }

    /// Computes and stores a histogram with `n` equal-width bins over `binrange` (defaults to the
    /// limits).
    pub fn histogramize(
        &mut self,
        n: usize,
        binrange: Option<Limits<T>>,
    ) -> Result<&Histogram<T>, QproxError> {
        let binrange = binrange.unwrap_or(self.limits);
        let (histogram, from) = self.compute_histogram(n, binrange)?;

        self.echo(format_args!(
            "pdf_histogramize\n\tbins = {}\n\tbinrange = [{}, {}]\n\tfrom = {:?}",
            n,
            binrange.min(),
            binrange.max(),
            from
        ));

        self.store.mark_used(RepresentationKind::Histogram);

        let entry = self
            .store
            .insert(Representation::Histogram(histogram), from)?;

        entry
            .representation
            .as_histogram()
            .ok_or_else(|| unavailable("Pdf::histogramize", RepresentationKind::Histogram))
    }

    /// Integrates the density of the representation `using` over `bounds`.
    ///
    /// For representations other than truth and mixture model, the bounds must lie within the
    /// limits.
    pub fn integrate(
        &mut self,
        bounds: Limits<T>,
        using: RepresentationKind,
    ) -> Result<T, QproxError> {
        let (lo, hi) = bounds.tuple();

        let value = if using.is_capability() {
            let capability = self.capability_of(using, "Pdf::integrate")?;

            integrate(
                |x| Ok(capability.density(x)),
                lo,
                hi,
                &self.settings.quadrature,
            )?
        } else {
            if !self.limits.contains_limits(&bounds) {
                return Err(QproxError::Domain {
                    operation: "Pdf::integrate",
                    msg: format!(
                        "bounds [{}, {}] exceed the limits [{}, {}]",
                        lo,
                        hi,
                        self.limits.min(),
                        self.limits.max()
                    ),
                });
            }

            self.interpolant(using)?.integrate(lo, hi)?
        };

        self.store.mark_used(using);

        Ok(value)
    }

    /// Returns the cached [`Interpolant`] of the representation `using` for the active scheme,
    /// rebuilding it if the representation, scheme or histogram mode has changed.
    ///
    /// Absent quantiles or histograms are derived and stored first.
    pub fn interpolant(
        &mut self,
        using: RepresentationKind,
    ) -> Result<&Interpolant<T>, QproxError> {
        if using.is_capability() {
            return Err(QproxError::UnsupportedRepresentation {
                operation: "Pdf::interpolant",
                kind: using,
                msg: "capabilities are evaluated directly",
            });
        }

        self.ensure(using, "Pdf::interpolant")?;

        let key = self.cache_key(using);

        let cache = match self.cache.take() {
            Some(cache) if cache.key == key => cache,
            _ => {
                let interpolant = self.build_interpolant(using, key.scheme)?;

                self.echo(format_args!(
                    "pdf_interpolant\n\tusing = {:?}\n\tscheme = {:?}\n\trevision = {}",
                    using, key.scheme, key.revision
                ));

                InterpolantCache { interpolant, key }
            }
        };

        Ok(&self.cache.insert(cache).interpolant)
    }

    /// Returns the last used representation kind.
    pub fn last_used(&self) -> Option<RepresentationKind> {
        self.store.last_used()
    }

    /// Returns the evaluation limits.
    pub fn limits(&self) -> &Limits<T> {
        &self.limits
    }

    /// Fits a Gaussian mixture with `n_components` components (see [`GaussianMixtureEm`]).
    pub fn mix_mod_fit(
        &mut self,
        n_components: usize,
        rng: &mut impl Rng,
    ) -> Result<&Capability<T>, QproxError> {
        self.mix_mod_fit_with(&GaussianMixtureEm::default(), n_components, rng)
    }

    /// Fits a mixture model with `n_components` components using `fitter`.
    ///
    /// The stored samples are used, if there are none they are drawn from the truth or, failing
    /// that, from the seed representation.
    pub fn mix_mod_fit_with<F>(
        &mut self,
        fitter: &F,
        n_components: usize,
        rng: &mut impl Rng,
    ) -> Result<&Capability<T>, QproxError>
    where
        F: MixtureFitter<T> + ?Sized,
    {
        let samples = match self.samples() {
            Some(samples) => samples.to_vec(),
            None => {
                let source = if self.store.contains(RepresentationKind::Truth) {
                    RepresentationKind::Truth
                } else {
                    self.store.seed()
                };

                self.sample(self.settings.default_samples, source, false, rng)?
                    .to_vec()
            }
        };

        let capability = fitter.fit(&samples, n_components)?;

        self.echo(format_args!(
            "pdf_mix_mod_fit\n\tcomponents = {}\n\tsamples = {}",
            n_components,
            samples.len()
        ));

        self.store.mark_used(RepresentationKind::MixMod);

        let entry = self
            .store
            .insert(Representation::MixMod(capability), RepresentationKind::Samples)?;

        entry
            .representation
            .as_capability()
            .ok_or_else(|| unavailable("Pdf::mix_mod_fit", RepresentationKind::MixMod))
    }

    /// Returns the fitted mixture model.
    pub fn mix_mod(&self) -> Option<&Capability<T>> {
        self.store
            .representation(RepresentationKind::MixMod)
            .and_then(Representation::as_capability)
    }

    /// Computes the `n`-th moment `∫ xⁿ f(x) dx` of the representation `using` over `limits`
    /// without modifying any cached state.
    ///
    /// As for normalized evaluation, interpolated representations are integrated over `limits`
    /// clipped to their interpolation range.
    pub fn moment(
        &self,
        using: RepresentationKind,
        n: usize,
        limits: &Limits<T>,
    ) -> Result<T, QproxError> {
        let order = i32::try_from(n).map_err(|_| QproxError::Domain {
            operation: "Pdf::moment",
            msg: format!("moment order {} is too large", n),
        })?;

        let (lo, hi) = limits.tuple();

        if using.is_capability() {
            let capability = self.capability_of(using, "Pdf::moment")?;

            integrate(
                |x| Ok(powi!(x, order) * capability.density(x)),
                lo,
                hi,
                &self.settings.quadrature,
            )
        } else {
            self.with_interpolant(using, |interpolant| {
                let (lo, hi) = support(interpolant, limits)?;

                interpolant.moment(lo, hi, order)
            })
        }
    }

    /// Create a new [`Pdf`] from a `seed` representation with default [`PdfSettings`].
    pub fn new(seed: Representation<T>, limits: Limits<T>) -> Result<Self, QproxError> {
        Self::with_settings(seed, limits, PdfSettings::default())
    }

    /// Returns the stored quantiles.
    pub fn quantiles(&self) -> Option<&Quantiles<T>> {
        self.store
            .representation(RepresentationKind::Quantiles)
            .and_then(Representation::as_quantiles)
    }

    /// Computes and stores `n` quantiles at the levels `i / (n + 1)`, of the density truncated to
    /// `limits` (defaults to the evaluation limits).
    pub fn quantize(
        &mut self,
        n: usize,
        limits: Option<Limits<T>>,
    ) -> Result<&Quantiles<T>, QproxError> {
        let limits = limits.unwrap_or(self.limits);
        let (quantiles, from) = self.compute_quantiles(n, limits)?;

        quantiles.check_limits(&self.limits)?;

        self.echo(format_args!(
            "pdf_quantize\n\tquantiles = {}\n\tlimits = [{}, {}]\n\tfrom = {:?}",
            n,
            limits.min(),
            limits.max(),
            from
        ));

        self.store.mark_used(RepresentationKind::Quantiles);

        let entry = self
            .store
            .insert(Representation::Quantiles(quantiles), from)?;

        entry
            .representation
            .as_quantiles()
            .ok_or_else(|| unavailable("Pdf::quantize", RepresentationKind::Quantiles))
    }

    /// Draw `n` samples from the representation `using`.
    ///
    /// The samples are stored unless `resample` is set (or the pdf was seeded with samples).
    pub fn sample(
        &mut self,
        n: usize,
        using: RepresentationKind,
        resample: bool,
        rng: &mut impl Rng,
    ) -> Result<Samples<T>, QproxError> {
        if n == 0 {
            return Err(QproxError::Domain {
                operation: "Pdf::sample",
                msg: String::from("the number of samples must be positive"),
            });
        }

        if using == RepresentationKind::Samples {
            return Err(QproxError::UnsupportedRepresentation {
                operation: "Pdf::sample",
                kind: using,
                msg: "samples have no sampling procedure",
            });
        }

        if matches!(
            using,
            RepresentationKind::Quantiles | RepresentationKind::Histogram
        ) {
            self.ensure(using, "Pdf::sample")?;
        }

        let values = match self.store.representation(using) {
            Some(Representation::MixMod(capability)) | Some(Representation::Truth(capability)) => {
                capability.draw_samples(n, rng)
            }
            Some(Representation::Gridded(gridded)) => gridded.draw_samples(n, rng)?,
            Some(Representation::Histogram(histogram)) => histogram.draw_samples(n, rng)?,
            Some(Representation::Quantiles(quantiles)) => {
                quantiles.draw_samples(n, &self.limits, rng)?
            }
            _ => return Err(unavailable("Pdf::sample", using)),
        };

        let samples = Samples::new(values)?;

        self.echo(format_args!(
            "pdf_sample\n\tusing = {:?}\n\tsamples = {}\n\tresample = {}",
            using, n, resample
        ));

        if resample || (self.store.seed() == RepresentationKind::Samples) {
            self.store.mark_used(using);
        } else {
            self.store.mark_used(RepresentationKind::Samples);
            self.store
                .insert(Representation::Samples(samples.clone()), using)?;
        }

        Ok(samples)
    }

    /// Returns the stored samples.
    pub fn samples(&self) -> Option<&Samples<T>> {
        self.store
            .representation(RepresentationKind::Samples)
            .and_then(Representation::as_samples)
    }

    /// Returns the active interpolation scheme.
    pub fn scheme(&self) -> Scheme {
        self.settings.scheme
    }

    /// Sets the histogram mode, cached interpolants built with another mode are rebuilt on use.
    pub fn set_histogram_mode(&mut self, mode: HistogramMode) {
        self.settings.histogram_mode = mode;
    }

    /// Replaces the strategy that reconstructs a density from samples.
    pub fn set_reconstruction(&mut self, reconstruction: Arc<dyn SampleReconstruction<T>>) {
        self.reconstruction = reconstruction;
        self.cache = None;
    }

    /// Sets the active interpolation scheme for all further operations.
    pub fn set_scheme(&mut self, scheme: Scheme) {
        self.settings.scheme = scheme;
    }

    /// Sets the verbosity of the operation echoes.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.settings.verbose = verbose;
    }

    /// Returns the settings.
    pub fn settings(&self) -> &PdfSettings<T> {
        &self.settings
    }

    /// Returns the representation store.
    pub fn store(&self) -> &RepresentationStore<T> {
        &self.store
    }

    /// Returns the truth capability.
    pub fn truth(&self) -> Option<&Capability<T>> {
        self.store
            .representation(RepresentationKind::Truth)
            .and_then(Representation::as_capability)
    }

    /// Create a new [`Pdf`] from a `seed` representation.
    ///
    /// A mixture model can not be used as seed, and quantile values must lie strictly within the
    /// limits.
    pub fn with_settings(
        seed: Representation<T>,
        limits: Limits<T>,
        settings: PdfSettings<T>,
    ) -> Result<Self, QproxError> {
        settings.validate()?;

        match &seed {
            Representation::MixMod(_) => {
                return Err(QproxError::UnsupportedRepresentation {
                    operation: "Pdf::new",
                    kind: RepresentationKind::MixMod,
                    msg: "a mixture model can only be obtained by fitting",
                });
            }
            Representation::Quantiles(quantiles) => quantiles.check_limits(&limits)?,
            _ => (),
        }

        let pdf = Self {
            cache: None,
            limits,
            reconstruction: Arc::new(GaussianKde::default()),
            settings,
            store: RepresentationStore::new(seed),
        };

        pdf.echo(format_args!(
            "pdf_new\n\tseed = {:?}\n\tlimits = [{}, {}]",
            pdf.store.seed(),
            limits.min(),
            limits.max()
        ));

        Ok(pdf)
    }
}

impl<T> Pdf<T>
where
    T: fXX,
{
    fn cache_key(&self, kind: RepresentationKind) -> CacheKey {
        CacheKey {
            kind,
            mode: self.settings.histogram_mode,
            revision: self.store.get(kind).map_or(0, |entry| entry.revision),
            scheme: self.settings.scheme,
        }
    }

    /// Returns the active capability, the truth takes precedence over a mixture fit.
    fn capability(&self) -> Option<(RepresentationKind, &Capability<T>)> {
        [RepresentationKind::Truth, RepresentationKind::MixMod]
            .into_iter()
            .find_map(|kind| {
                self.store
                    .representation(kind)
                    .and_then(Representation::as_capability)
                    .map(|capability| (kind, capability))
            })
    }

    fn capability_of(
        &self,
        kind: RepresentationKind,
        operation: &'static str,
    ) -> Result<&Capability<T>, QproxError> {
        self.store
            .representation(kind)
            .and_then(Representation::as_capability)
            .ok_or_else(|| unavailable(operation, kind))
    }

    fn compute_histogram(
        &self,
        n: usize,
        binrange: Limits<T>,
    ) -> Result<(Histogram<T>, RepresentationKind), QproxError> {
        if n == 0 {
            return Err(QproxError::Domain {
                operation: "Pdf::histogramize",
                msg: String::from("the number of bins must be positive"),
            });
        }

        let edges = linspace(binrange.min(), binrange.max(), n + 1);

        let (values, from) = match self.capability() {
            Some((from, capability)) => (
                edges
                    .windows(2)
                    .map(|pair| {
                        integrate(
                            |x| Ok(capability.density(x)),
                            pair[0],
                            pair[1],
                            &self.settings.quadrature,
                        )
                    })
                    .collect::<Result<Vec<T>, QproxError>>()?,
                from,
            ),
            None => {
                let from = self.store.seed();
                let interpolant = self.build_interpolant(from, self.settings.scheme)?;

                (
                    edges
                        .windows(2)
                        .map(|pair| interpolant.integrate(pair[0], pair[1]))
                        .collect::<Result<Vec<T>, QproxError>>()?,
                    from,
                )
            }
        };

        // Tolerate quadrature noise around zero.
        let noise = self.settings.quadrature.tolerance;

        if let Some(value) = values.iter().find(|value| **value < -noise) {
            return Err(QproxError::Domain {
                operation: "Pdf::histogramize",
                msg: format!("negative bin mass {}", value),
            });
        }

        let values = values
            .into_iter()
            .map(|value| maxf!(value, T::zero()))
            .collect::<Vec<T>>();

        let total = values.iter().sum::<T>();

        if total > T::one() + sqrt!(self.settings.quadrature.tolerance) {
            warn!(
                "pdf_histogramize\n\tbin masses sum to {} > 1 over [{}, {}]",
                total,
                binrange.min(),
                binrange.max()
            );
        }

        Ok((Histogram::new(edges, values)?, from))
    }

    fn compute_quantiles(
        &self,
        n: usize,
        limits: Limits<T>,
    ) -> Result<(Quantiles<T>, RepresentationKind), QproxError> {
        if n == 0 {
            return Err(QproxError::Domain {
                operation: "Pdf::quantize",
                msg: String::from("the number of quantiles must be positive"),
            });
        }

        let levels = (1..=n)
            .map(|i| T::from_usize(i).unwrap() / T::from_usize(n + 1).unwrap())
            .collect::<Vec<T>>();

        let (values, from) = match self.capability() {
            Some((from, capability)) => {
                let (lo, hi) = limits.tuple();

                let cdf_lo = capability.cdf(lo);
                let mass = capability.cdf(hi) - cdf_lo;

                if !(mass > T::zero()) {
                    return Err(QproxError::Domain {
                        operation: "Pdf::quantize",
                        msg: format!("the density has no mass within [{}, {}]", lo, hi),
                    });
                }

                let values = levels
                    .iter()
                    .map(|p| capability.inverse_cdf(cdf_lo + *p * mass))
                    .collect::<Vec<T>>();

                if let Some(value) = values
                    .iter()
                    .find(|value| !num_traits::Float::is_finite(**value))
                {
                    return Err(QproxError::Domain {
                        operation: "Pdf::quantize",
                        msg: format!("inverse cdf returned a non-finite value {}", value),
                    });
                }

                (values, from)
            }
            None => {
                let from = self.store.seed();
                let interpolant = self.build_interpolant(from, self.settings.scheme)?;

                (
                    invert_cumulative(
                        &interpolant,
                        support(&interpolant, &limits)?,
                        &levels,
                        self.settings.cdf_resolution,
                    )?,
                    from,
                )
            }
        };

        Ok((Quantiles::new(levels, values)?, from))
    }

    fn echo(&self, args: Arguments) {
        if self.settings.verbose {
            info!("{}", args);
        } else {
            debug!("{}", args);
        }
    }

    /// Derives and stores an absent quantile or histogram representation with default counts.
    fn ensure(
        &mut self,
        kind: RepresentationKind,
        operation: &'static str,
    ) -> Result<(), QproxError> {
        if self.store.contains(kind) {
            return Ok(());
        }

        match kind {
            RepresentationKind::Histogram => {
                self.histogramize(self.settings.default_bins, None)?;
            }
            RepresentationKind::Quantiles => {
                self.quantize(self.settings.default_quantiles, None)?;
            }
            _ => return Err(unavailable(operation, kind)),
        }

        Ok(())
    }

    fn interpolant_of(
        &self,
        representation: &Representation<T>,
        scheme: Scheme,
    ) -> Result<Interpolant<T>, QproxError> {
        match representation {
            Representation::Gridded(gridded) => gridded.interpolant(scheme),
            Representation::Histogram(histogram) => {
                if (self.settings.histogram_mode == HistogramMode::Step)
                    && (scheme != Scheme::Step)
                {
                    debug!(
                        "pdf_interpolant\n\tscheme {:?} is ignored in step histogram mode",
                        scheme
                    );
                }

                histogram.interpolant(self.settings.histogram_mode, scheme)
            }
            Representation::Quantiles(quantiles) => {
                let (xs, ys) = quantiles.density_control_points(&self.limits)?;

                Interpolant::new(xs, ys, scheme)
            }
            Representation::Samples(samples) => {
                let xs = linspace(
                    self.limits.min(),
                    self.limits.max(),
                    self.settings.kde_resolution,
                );
                let ys = self.reconstruction.reconstruct(samples, &xs)?;

                Interpolant::new(xs, ys, scheme)
            }
            Representation::MixMod(_) | Representation::Truth(_) => {
                Err(QproxError::UnsupportedRepresentation {
                    operation: "Pdf::build_interpolant",
                    kind: representation.kind(),
                    msg: "capabilities are evaluated directly",
                })
            }
        }
    }

    /// Calls `f` with the cached interpolant of `using` if it is current, or a freshly built one.
    fn with_interpolant<R, F>(&self, using: RepresentationKind, f: F) -> Result<R, QproxError>
    where
        F: FnOnce(&Interpolant<T>) -> Result<R, QproxError>,
    {
        match &self.cache {
            Some(cache) if self.store.contains(using) && (cache.key == self.cache_key(using)) => {
                f(&cache.interpolant)
            }
            _ => f(&self.build_interpolant(using, self.settings.scheme)?),
        }
    }
}

/// Returns the integration range of `interpolant` within `limits`.
///
/// [`Scheme::Nearest`] is defined everywhere, any other scheme is restricted to its control points.
fn support<T>(interpolant: &Interpolant<T>, limits: &Limits<T>) -> Result<(T, T), QproxError>
where
    T: fXX,
{
    let (lo, hi) = limits.tuple();

    if interpolant.scheme() == Scheme::Nearest {
        return Ok((lo, hi));
    }

    let (minv, maxv) = interpolant.domain();
    let (lo, hi) = (maxf!(lo, minv), minf!(hi, maxv));

    if lo >= hi {
        return Err(QproxError::Domain {
            operation: "support",
            msg: format!(
                "interpolation range [{}, {}] does not overlap the limits [{}, {}]",
                minv,
                maxv,
                limits.min(),
                limits.max()
            ),
        });
    }

    Ok((lo, hi))
}

fn normalize<T>(values: Vec<T>, total: T) -> Result<Vec<T>, QproxError>
where
    T: fXX,
{
    if !(total > T::zero()) || !num_traits::Float::is_finite(total) {
        return Err(QproxError::Domain {
            operation: "normalize",
            msg: format!("cannot normalize by {}", total),
        });
    }

    Ok(values.into_iter().map(|value| value / total).collect())
}

/// Inverts the cumulative integral of `interpolant` over `range` at the fractions `levels`.
///
/// The cumulative integral is tabulated exactly on `resolution` evenly spaced points and inverted
/// linearly in between.
fn invert_cumulative<T>(
    interpolant: &Interpolant<T>,
    (lo, hi): (T, T),
    levels: &[T],
    resolution: usize,
) -> Result<Vec<T>, QproxError>
where
    T: fXX,
{
    let grid = linspace(lo, hi, resolution);

    let mut cumulative = Vec::with_capacity(grid.len());
    cumulative.push(T::zero());

    for pair in grid.windows(2) {
        let mass = maxf!(interpolant.integrate(pair[0], pair[1])?, T::zero());

        cumulative.push(cumulative[cumulative.len() - 1] + mass);
    }

    let total = cumulative[cumulative.len() - 1];

    if !(total > T::zero()) {
        return Err(QproxError::Domain {
            operation: "Pdf::quantize",
            msg: format!("the density has no mass within [{}, {}]", lo, hi),
        });
    }

    Ok(levels
        .iter()
        .map(|p| {
            let target = *p * total;
            let idx = (cumulative.partition_point(|c| *c <= target) - 1).min(grid.len() - 2);

            grid[idx]
                + (target - cumulative[idx]) / (cumulative[idx + 1] - cumulative[idx])
                    * (grid[idx + 1] - grid[idx])
        })
        .collect())
}

fn unavailable(operation: &'static str, kind: RepresentationKind) -> QproxError {
    QproxError::UnsupportedRepresentation {
        operation,
        kind,
        msg: match kind {
            RepresentationKind::Gridded => "no gridded representation has been computed",
            RepresentationKind::MixMod => "no mixture model has been fitted",
            RepresentationKind::Samples => "no samples are available",
            RepresentationKind::Truth => "no truth was provided",
            _ => "the representation is not available",
        },
    }
}
