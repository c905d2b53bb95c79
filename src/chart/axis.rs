use super::{Chart, Trace, ValueAxis};

/// Closed interval of values shown on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpan {
    pub min: f64,
    pub max: f64,
}

impl AxisSpan {
    /// Span of the finite values of the selected traces.
    pub fn of_traces<'a>(traces: impl IntoIterator<Item = &'a Trace>) -> Option<Self> {
        traces
            .into_iter()
            .filter_map(|t| t.series.value_range())
            .fold(None, |acc: Option<AxisSpan>, (lo, hi)| match acc {
                None => Some(AxisSpan { min: lo, max: hi }),
                Some(s) => Some(AxisSpan {
                    min: s.min.min(lo),
                    max: s.max.max(hi),
                }),
            })
    }

    /// Widen to include zero; bars grow from the baseline.
    pub fn with_zero(self) -> Self {
        Self {
            min: self.min.min(0.0),
            max: self.max.max(0.0),
        }
    }

    fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Degenerate spans get a unit width so they can be mapped.
    fn non_degenerate(self) -> Self {
        if self.width().abs() < f64::EPSILON {
            Self {
                min: self.min - 0.5,
                max: self.max + 0.5,
            }
        } else {
            self
        }
    }
}

// ---------------------------------------------------------------------------
// TwinAxis – emotion values mapped into the COVID axis' coordinates
// ---------------------------------------------------------------------------

/// egui_plot has a single y transform, so the right (emotion) axis is drawn
/// by mapping emotion values linearly onto the left axis' span and labelling
/// the right axis with the inverse mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwinAxis {
    factor: f64,
    offset: f64,
}

impl Default for TwinAxis {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TwinAxis {
    pub const IDENTITY: TwinAxis = TwinAxis {
        factor: 1.0,
        offset: 0.0,
    };

    /// Map `emotion` onto `covid`. Identity when either side has nothing to show.
    pub fn fit(covid: Option<AxisSpan>, emotion: Option<AxisSpan>) -> Self {
        let (Some(covid), Some(emotion)) = (covid, emotion) else {
            return Self::IDENTITY;
        };
        let covid = covid.non_degenerate();
        let emotion = emotion.non_degenerate();
        let factor = covid.width() / emotion.width();
        Self {
            factor,
            offset: covid.min - emotion.min * factor,
        }
    }

    /// Fit over the traces currently drawn; `visible[i]` belongs to `chart.traces[i]`.
    pub fn for_visible(chart: &Chart, visible: &[bool]) -> Self {
        let covid =
            AxisSpan::of_traces(shown(chart, visible, ValueAxis::Covid)).map(AxisSpan::with_zero);
        let emotion = AxisSpan::of_traces(shown(chart, visible, ValueAxis::Emotion));
        Self::fit(covid, emotion)
    }

    /// Emotion value → plot y.
    pub fn to_plot(&self, emotion_value: f64) -> f64 {
        emotion_value * self.factor + self.offset
    }

    /// Plot y → emotion value, for labelling the right axis.
    pub fn to_emotion(&self, plot_y: f64) -> f64 {
        (plot_y - self.offset) / self.factor
    }
}

fn shown<'a>(
    chart: &'a Chart,
    visible: &'a [bool],
    axis: ValueAxis,
) -> impl Iterator<Item = &'a Trace> + 'a {
    chart
        .traces_on(axis)
        .filter(move |(i, _)| visible.get(*i).copied().unwrap_or(false))
        .map(|(_, t)| t)
}
