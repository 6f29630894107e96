//! Chart handles shared between worksheets, chartsheets and the workbook.
//!
//! Only the chart's configuration is recorded here; the chart part itself is
//! written by the chart subsystem from these settings.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a chart.
pub type ChartRef = Rc<RefCell<Chart>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Area,
    Bar,
    #[default]
    Column,
    Line,
    Pie,
    Scatter,
    Stock,
    Radar,
}

/// One data series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartSeries {
    /// Series values as a formula, e.g. `=Sheet1!$B$2:$B$7`.
    pub values: String,
    pub categories: Option<String>,
    pub name: Option<String>,
    pub y2_axis: bool,
}

impl ChartSeries {
    pub fn new(values: &str) -> Self {
        Self {
            values: values.to_string(),
            ..Default::default()
        }
    }

    pub fn with_categories(mut self, categories: &str) -> Self {
        self.categories = Some(categories.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartAxis {
    pub name: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub major_unit: Option<f64>,
    pub minor_unit: Option<f64>,
    pub reverse: bool,
    pub log_base: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartTitle {
    pub name: Option<String>,
    pub overlay: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartLegend {
    pub position: Option<String>,
    pub delete: bool,
}

/// Border and fill of the plot or chart area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartArea {
    pub border_color: Option<String>,
    pub fill_color: Option<String>,
    pub no_border: bool,
}

/// How empty cells are plotted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlanksAs {
    #[default]
    Gap,
    Zero,
    Span,
}

impl BlanksAs {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gap => "gap",
            Self::Zero => "zero",
            Self::Span => "span",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    kind: ChartType,
    id: Option<u32>,
    name: Option<String>,
    embedded: bool,
    protected: bool,
    series: Vec<ChartSeries>,
    x_axis: ChartAxis,
    y_axis: ChartAxis,
    x2_axis: ChartAxis,
    y2_axis: ChartAxis,
    title: Option<ChartTitle>,
    legend: ChartLegend,
    plotarea: ChartArea,
    chartarea: ChartArea,
    style: u8,
    show_blanks_as: BlanksAs,
    show_hidden_data: bool,
}

impl Chart {
    pub fn new(kind: ChartType) -> Self {
        Self {
            kind,
            embedded: true,
            style: 2,
            ..Default::default()
        }
    }

    /// Wrap the chart in a shareable handle.
    pub fn into_ref(self) -> ChartRef {
        Rc::new(RefCell::new(self))
    }

    pub fn kind(&self) -> ChartType {
        self.kind
    }

    /// The workbook-wide chart id, assigned when a drawing first places it.
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: u32) {
        self.id = Some(id);
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name of the drawing object, shown in Excel's selection pane.
    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    /// Whether the chart lives inside a worksheet drawing.
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub(crate) fn set_embedded(&mut self, embedded: bool) {
        self.embedded = embedded;
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub(crate) fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
    }

    pub fn add_series(&mut self, series: ChartSeries) {
        self.series.push(series);
    }

    pub fn series(&self) -> &[ChartSeries] {
        &self.series
    }

    pub fn set_x_axis(&mut self, axis: ChartAxis) {
        self.x_axis = axis;
    }

    pub fn set_y_axis(&mut self, axis: ChartAxis) {
        self.y_axis = axis;
    }

    pub fn set_x2_axis(&mut self, axis: ChartAxis) {
        self.x2_axis = axis;
    }

    pub fn set_y2_axis(&mut self, axis: ChartAxis) {
        self.y2_axis = axis;
    }

    pub fn x_axis(&self) -> &ChartAxis {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &ChartAxis {
        &self.y_axis
    }

    pub fn x2_axis(&self) -> &ChartAxis {
        &self.x2_axis
    }

    pub fn y2_axis(&self) -> &ChartAxis {
        &self.y2_axis
    }

    pub fn set_title(&mut self, title: ChartTitle) {
        self.title = Some(title);
    }

    pub fn title(&self) -> Option<&ChartTitle> {
        self.title.as_ref()
    }

    pub fn set_legend(&mut self, legend: ChartLegend) {
        self.legend = legend;
    }

    pub fn legend(&self) -> &ChartLegend {
        &self.legend
    }

    pub fn set_plotarea(&mut self, area: ChartArea) {
        self.plotarea = area;
    }

    pub fn plotarea(&self) -> &ChartArea {
        &self.plotarea
    }

    pub fn set_chartarea(&mut self, area: ChartArea) {
        self.chartarea = area;
    }

    pub fn chartarea(&self) -> &ChartArea {
        &self.chartarea
    }

    /// Built-in style 1..=48; anything else falls back to 2.
    pub fn set_style(&mut self, style: u8) {
        self.style = if (1..=48).contains(&style) { style } else { 2 };
    }

    pub fn style(&self) -> u8 {
        self.style
    }

    pub fn show_blanks_as(&mut self, option: BlanksAs) {
        self.show_blanks_as = option;
    }

    pub fn blanks_as(&self) -> BlanksAs {
        self.show_blanks_as
    }

    pub fn show_hidden_data(&mut self) {
        self.show_hidden_data = true;
    }

    pub fn is_showing_hidden_data(&self) -> bool {
        self.show_hidden_data
    }
}
