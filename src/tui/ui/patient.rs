//! Patient data input form.
//!
//! Numeric fields are free text; categorical fields are selectors that cycle
//! through their encoding table. The surgical selectors only offer choices
//! that are legal for the field before them.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    allowed_procedures, allowed_reconstructions, bmi_preview, CategoricalField, RawPatientInput,
};
use crate::tui::styles::MedicalTheme;

const AGE: usize = 0;
const SEX: usize = 1;
const HEIGHT: usize = 2;
const WEIGHT: usize = 3;
const CEA: usize = 4;
const CA19_9: usize = 5;
const PRE_CHEMO: usize = 6;
const ASA_PS: usize = 7;
const LOCATION: usize = 8;
const PROCEDURE: usize = 9;
const RECONSTRUCTION: usize = 10;
const MACRO_TYPE: usize = 11;
const DIAMETER: usize = 12;
const HISTOLOGY: usize = 13;
const P_T: usize = 14;
const P_N: usize = 15;
const VASCULAR_INVASION: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric { hint: &'static str },
    Choice(CategoricalField),
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub kind: FieldKind,
    /// Typed text, or the selected label for a choice
    pub value: String,
}

impl FormField {
    fn numeric(label: &'static str, hint: &'static str) -> Self {
        Self {
            label,
            kind: FieldKind::Numeric { hint },
            value: String::new(),
        }
    }

    fn choice(field: CategoricalField) -> Self {
        Self {
            label: field.label(),
            kind: FieldKind::Choice(field),
            value: field.table().labels().next().unwrap_or_default().to_string(),
        }
    }
}

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        let mut state = Self {
            fields: vec![
                FormField::numeric("Age", "years"),
                FormField::choice(CategoricalField::Sex),
                FormField::numeric("Height", "cm"),
                FormField::numeric("Weight", "kg"),
                FormField::numeric("CEA", "ng/mL"),
                FormField::numeric("CA19-9", "U/mL"),
                FormField::choice(CategoricalField::PreChemo),
                FormField::choice(CategoricalField::AsaPs),
                FormField::choice(CategoricalField::TumorLocation),
                FormField::choice(CategoricalField::SurgicalProcedure),
                FormField::choice(CategoricalField::Reconstruction),
                FormField::choice(CategoricalField::MacroType),
                FormField::choice(CategoricalField::Diameter),
                FormField::choice(CategoricalField::Histology),
                FormField::choice(CategoricalField::PathologicalT),
                FormField::choice(CategoricalField::PathologicalN),
                FormField::choice(CategoricalField::VascularInvasion),
            ],
            selected_field: 0,
            error_message: None,
        };
        state.restrict_dependents();
        state
    }
}

impl PatientFormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    fn current_is_numeric(&self) -> bool {
        matches!(
            self.fields[self.selected_field].kind,
            FieldKind::Numeric { .. }
        )
    }

    /// Add a character to the current numeric field
    pub fn input_char(&mut self, c: char) {
        if self.current_is_numeric() && (c.is_ascii_digit() || c == '.' || c == '-') {
            self.fields[self.selected_field].value.push(c);
            self.error_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        if self.current_is_numeric() {
            self.fields[self.selected_field].value.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if self.current_is_numeric() {
            self.fields[self.selected_field].value.zeroize();
        }
    }

    /// Choices currently offered for a field; empty for numeric fields.
    #[must_use]
    pub fn options(&self, index: usize) -> Vec<&'static str> {
        match self.fields[index].kind {
            FieldKind::Numeric { .. } => Vec::new(),
            FieldKind::Choice(CategoricalField::SurgicalProcedure) => {
                allowed_procedures(&self.fields[LOCATION].value).to_vec()
            }
            FieldKind::Choice(CategoricalField::Reconstruction) => {
                allowed_reconstructions(&self.fields[PROCEDURE].value).to_vec()
            }
            FieldKind::Choice(field) => field.table().labels().collect(),
        }
    }

    /// Step the current selector forward or backward, wrapping around.
    pub fn cycle_choice(&mut self, forward: bool) {
        let options = self.options(self.selected_field);
        if options.is_empty() {
            return;
        }
        let field = &mut self.fields[self.selected_field];
        let current = options.iter().position(|o| *o == field.value);
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % options.len(),
            (Some(0), false) => options.len() - 1,
            (Some(i), false) => i - 1,
        };
        field.value = options[next].to_string();
        self.error_message = None;
        self.restrict_dependents();
    }

    /// Snap procedure and reconstruction to a legal choice after an upstream
    /// change.
    fn restrict_dependents(&mut self) {
        for index in [PROCEDURE, RECONSTRUCTION] {
            let options = self.options(index);
            if !options.contains(&self.fields[index].value.as_str()) {
                self.fields[index].value = options.first().copied().unwrap_or_default().to_string();
            }
        }
    }

    #[must_use]
    pub fn bmi_preview(&self) -> Option<f64> {
        bmi_preview(&self.fields[HEIGHT].value, &self.fields[WEIGHT].value)
    }

    /// Set when height and weight are both filled in but no BMI can be derived.
    #[must_use]
    pub fn bmi_warning(&self) -> Option<&'static str> {
        let filled = |i: usize| !self.fields[i].value.trim().is_empty();
        if filled(HEIGHT) && filled(WEIGHT) && self.bmi_preview().is_none() {
            Some("Height and weight must be positive numbers.")
        } else {
            None
        }
    }

    /// Copy the form into a raw input record for validation.
    #[must_use]
    pub fn to_raw_input(&self) -> RawPatientInput {
        let v = |i: usize| self.fields[i].value.clone();
        RawPatientInput {
            age: v(AGE),
            sex: v(SEX),
            height: v(HEIGHT),
            weight: v(WEIGHT),
            cea: v(CEA),
            ca19_9: v(CA19_9),
            pre_chemo: v(PRE_CHEMO),
            asa_ps: v(ASA_PS),
            tumor_location: v(LOCATION),
            surgical_procedure: v(PROCEDURE),
            reconstruction: v(RECONSTRUCTION),
            macro_type: v(MACRO_TYPE),
            diameter: v(DIAMETER),
            histology: v(HISTOLOGY),
            p_t: v(P_T),
            p_n: v(P_N),
            vascular_invasion: v(VASCULAR_INVASION),
        }
    }

    /// Wipe all field buffers and reset the form.
    ///
    /// Called once a submission has been handed to the predictor so patient
    /// values do not persist in UI state.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            field.value.zeroize();
        }
        *self = Self::default();
    }

    /// Load a typical post-gastrectomy patient
    pub fn load_sample_data(&mut self) {
        let sample = [
            "65",           // age
            "Male",         // sex
            "165",          // height (cm)
            "60",           // weight (kg)
            "3.5",          // CEA
            "12",           // CA19-9
            "no",           // neoadjuvant chemo
            "2",            // ASA-PS
            "M",            // location
            "DG",           // procedure
            "B-1",          // reconstruction
            "Type 1/2/3/5", // macroscopic type
            "<80mm",        // diameter
            "por/sig/muc",  // histology
            "pT3",          // pT
            "pN1",          // pN
            "Positive",     // v
        ];
        for (field, value) in self.fields.iter_mut().zip(sample) {
            field.value = value.to_string();
        }
        self.error_message = None;
        self.restrict_dependents();
    }
}

/// Render the patient data input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(2), // BMI preview
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_bmi_preview(f, chunks[2], state);
    render_form_footer(f, chunks[3], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Patient Data Entry", MedicalTheme::title()),
        Span::styled(
            " │ Gastric cancer, 3-year recurrence-free survival",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;
    render_field_column(f, columns[0], state, 0..mid);
    render_field_column(f, columns[1], state, mid..state.fields.len());
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    state: &PatientFormState,
    range: std::ops::Range<usize>,
) {
    let lines: Vec<Line> = range.map(|i| field_line(state, i)).collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(state: &PatientFormState, index: usize) -> Line<'_> {
    let field = &state.fields[index];
    let is_selected = index == state.selected_field;

    let label_style = if is_selected {
        MedicalTheme::focused()
    } else {
        MedicalTheme::text_secondary()
    };
    let mut spans = vec![Span::styled(format!(" {:<22}", field.label), label_style)];

    match field.kind {
        FieldKind::Numeric { hint } => {
            if field.value.is_empty() {
                spans.push(Span::styled(hint, MedicalTheme::text_muted()));
            } else {
                spans.push(Span::styled(field.value.as_str(), MedicalTheme::text()));
            }
            if is_selected {
                spans.push(Span::styled("▌", MedicalTheme::cursor()));
            }
        }
        FieldKind::Choice(_) => {
            if is_selected {
                let options = state.options(index);
                spans.push(Span::styled(
                    format!("◂ {} ▸", field.value),
                    MedicalTheme::selected(),
                ));
                if options.len() > 1 {
                    spans.push(Span::styled(
                        format!("  {}", options.join(" / ")),
                        MedicalTheme::text_muted(),
                    ));
                }
            } else {
                spans.push(Span::styled(field.value.as_str(), MedicalTheme::text()));
            }
        }
    }

    Line::from(spans)
}

fn render_bmi_preview(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let line = match state.bmi_preview() {
        Some(bmi) => Line::from(vec![
            Span::styled(" BMI: ", MedicalTheme::text_secondary()),
            Span::styled(format!("{bmi:.1}"), MedicalTheme::info()),
        ]),
        None => match state.bmi_warning() {
            Some(warning) => Line::from(vec![
                Span::styled(" ! ", MedicalTheme::warning()),
                Span::styled(warning, MedicalTheme::warning()),
            ]),
            None => Line::from(""),
        },
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Choose ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Predict ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample Data ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
