//! A portfolio session: one universe, one moment estimate, one set of
//! constraints, and the requests run against them.

use tracing::info;

use crate::config::SessionConfig;
use crate::data::{BenchmarkSeries, ReturnTable};
use crate::error::{FrontierError, Result};
use crate::frontier::{
    evaluate, FrontierBuilder, FrontierPoint, MatchSettings, TargetMatch, TargetMatcher,
};
use crate::model::{AssetUniverse, Constraints, MomentEstimate, Portfolio};
use crate::report::{PortfolioReport, ScatterPoint, SessionReport};
use crate::solver::Settings;

/// Label of the equal-weight benchmark portfolio.
pub const EQUAL_WEIGHT_LABEL: &str = "Equal weight";

/// Parameters of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub num_portfolios: usize,
    pub target_return: Option<f64>,
    pub target_risk: Option<f64>,
}

impl RunRequest {
    pub fn from_config(config: &SessionConfig) -> Self {
        RunRequest {
            num_portfolios: config.frontier.num_portfolios,
            target_return: config.targets.target_return,
            target_risk: config.targets.target_risk,
        }
    }
}

/// Immutable session state.
#[derive(Debug, Clone)]
pub struct Session {
    universe: AssetUniverse,
    periods: usize,
    moments: MomentEstimate,
    constraints: Constraints,
    benchmarks: Vec<BenchmarkSeries>,
    solver: Settings,
    matcher: MatchSettings,
    min_weight: f64,
}

impl Session {
    /// Create a session from already estimated moments.
    pub fn new(
        universe: AssetUniverse,
        moments: MomentEstimate,
        constraints: Constraints,
    ) -> Result<Self> {
        for got in [moments.num_assets(), constraints.num_assets()] {
            if got != universe.len() {
                return Err(FrontierError::DimensionMismatch {
                    expected: universe.len(),
                    got,
                });
            }
        }
        Ok(Session {
            universe,
            periods: 0,
            moments,
            constraints,
            benchmarks: Vec::new(),
            solver: Settings::default(),
            matcher: MatchSettings::default(),
            min_weight: 1e-4,
        })
    }

    /// Estimate moments from a loaded table and apply the configuration.
    pub fn from_table(table: ReturnTable, config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        let moments = MomentEstimate::from_sample(&table.sample)?;
        let constraints = config.frontier.constraints(table.universe.len())?;
        let periods = table.periods();

        let mut session = Session::new(table.universe, moments, constraints)?
            .with_solver_settings(config.solver.clone())
            .with_match_settings(config.matcher.clone())
            .with_min_weight(config.output.min_weight);
        session.periods = periods;
        session.benchmarks = table.benchmarks;
        Ok(session)
    }

    pub fn with_solver_settings(mut self, settings: Settings) -> Self {
        self.solver = settings;
        self
    }

    pub fn with_match_settings(mut self, settings: MatchSettings) -> Self {
        self.matcher = settings;
        self
    }

    pub fn with_min_weight(mut self, min_weight: f64) -> Self {
        self.min_weight = min_weight;
        self
    }

    pub fn with_benchmarks(mut self, benchmarks: Vec<BenchmarkSeries>) -> Self {
        self.benchmarks = benchmarks;
        self
    }

    pub fn universe(&self) -> &AssetUniverse {
        &self.universe
    }

    pub fn moments(&self) -> &MomentEstimate {
        &self.moments
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Frontier builder over this session's moments and constraints.
    pub fn builder(&self) -> Result<FrontierBuilder<'_>> {
        Ok(FrontierBuilder::new(&self.moments, &self.constraints)?
            .with_settings(self.solver.clone()))
    }

    /// Target matcher over this session's frontier.
    pub fn matcher(&self) -> Result<TargetMatcher<'_>> {
        Ok(TargetMatcher::new(self.builder()?)?.with_settings(self.matcher.clone()))
    }

    /// The `1/N` portfolio.
    pub fn equal_weight(&self) -> Result<FrontierPoint> {
        FrontierPoint::evaluate(&self.moments, Portfolio::equal_weight(self.universe.len()))
    }

    /// Risk and return of each benchmark index series.
    pub fn benchmark_points(&self) -> Result<Vec<ScatterPoint>> {
        self.benchmarks
            .iter()
            .map(|b| {
                let moments = b.moments()?;
                let rr = evaluate(&moments, Portfolio::single_asset(1, 0).weights())?;
                Ok(ScatterPoint::new(b.name.clone(), rr))
            })
            .collect()
    }

    /// Run the whole pipeline: benchmarks, frontier and target matching.
    pub fn run(&self, request: &RunRequest) -> Result<SessionReport> {
        if request.num_portfolios == 0 {
            return Err(FrontierError::InvalidParameter(
                "number of frontier portfolios must be at least 1".into(),
            ));
        }

        let equal = self.equal_weight()?;
        let equal_report = PortfolioReport::from_point(
            EQUAL_WEIGHT_LABEL,
            &equal,
            &self.universe,
            self.min_weight,
        );
        let mut benchmarks = vec![equal_report.scatter_point()];
        benchmarks.extend(self.benchmark_points()?);

        let matcher = self.matcher()?;
        let frontier = self
            .builder()?
            .build_with_limits(request.num_portfolios, matcher.limits())?;
        info!(points = frontier.len(), "frontier ready");

        let frontier_portfolios = frontier
            .iter()
            .enumerate()
            .map(|(i, p)| {
                PortfolioReport::from_point(
                    format!("Frontier {}", i + 1),
                    p,
                    &self.universe,
                    self.min_weight,
                )
            })
            .collect();

        let mut matches: Vec<TargetMatch> = Vec::new();
        if let Some(r) = request.target_return {
            matches.push(matcher.by_return(r)?);
        }
        if let Some(s) = request.target_risk {
            matches.push(matcher.by_risk(s)?);
        }

        Ok(SessionReport {
            assets: self.universe.names().to_vec(),
            periods: self.periods,
            frontier: frontier.line(),
            frontier_portfolios,
            benchmarks,
            equal_weight: equal_report,
            matches: matches
                .iter()
                .map(|m| PortfolioReport::from_match(m, &self.universe, self.min_weight))
                .collect(),
        })
    }
}
