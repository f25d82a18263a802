use crate::dataset::{Dataset, Partition, RowIndex};
use crate::error::{AnonymizationError, Result};
use crate::span::{get_spans_for, Spans};
use crate::split::split;
use crate::validity::Validity;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Outcome of processing one queued partition.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// The partition was split along `column`; both children were queued.
    Split { column: String },
    /// No column produced two valid children; the partition is final.
    Finished,
    /// The queue was already empty.
    Idle,
}

/// Greedy Mondrian partitioner over an explicit FIFO work queue.
///
/// Each step pops the front partition, ranks the feature columns by descending scaled span
/// (ties broken by column name) and commits the first split whose children both pass the
/// validity predicate. Partitions without such a split are finished and never revisited.
pub struct Partitioner<'a, V: Validity + ?Sized> {
    dataset: &'a Dataset,
    feature_columns: Vec<String>,
    sensitive_column: String,
    scale: Spans,
    validity: &'a V,
    queue: VecDeque<Partition>,
    finished: Vec<Partition>,
}

impl<'a, V: Validity + ?Sized> Partitioner<'a, V> {
    pub fn new<S: AsRef<str>>(
        dataset: &'a Dataset,
        feature_columns: &[S],
        sensitive_column: &str,
        scale: &Spans,
        validity: &'a V,
    ) -> Result<Self> {
        dataset.column(sensitive_column)?;

        let mut relevant_scale = Spans::new();
        for column in feature_columns {
            let column = column.as_ref();
            if column == sensitive_column {
                return Err(AnonymizationError::InvalidConfiguration(format!(
                    "column {} is both a feature and the sensitive column",
                    column
                )));
            }

            dataset.column(column)?;

            let column_scale = scale
                .get(column)
                .ok_or_else(|| AnonymizationError::MissingScale(column.to_string()))?;
            relevant_scale.insert(column.to_string(), *column_scale);
        }

        let mut queue = VecDeque::new();
        if dataset.num_rows() > 0 {
            queue.push_back(dataset.full_partition());
        }

        Ok(Self {
            dataset,
            feature_columns: feature_columns
                .iter()
                .map(|column| column.as_ref().to_string())
                .collect(),
            sensitive_column: sensitive_column.to_string(),
            scale: relevant_scale,
            validity,
            queue,
            finished: vec![],
        })
    }

    /// Partitions still waiting to be processed, front first.
    pub fn queue(&self) -> &VecDeque<Partition> {
        &self.queue
    }

    pub fn finished(&self) -> &[Partition] {
        &self.finished
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    /// Feature columns ordered by descending scaled span, then by name.
    pub fn ranked_columns(&self, partition: &[RowIndex]) -> Result<Vec<(String, f64)>> {
        let spans = get_spans_for(
            self.dataset,
            &self.feature_columns,
            partition,
            Some(&self.scale),
        )?;

        let mut column_span_vec: Vec<(String, f64)> = spans.into_iter().collect();
        column_span_vec.sort_by(|(a_name, a_span), (b_name, b_span)| {
            b_span.total_cmp(a_span).then_with(|| a_name.cmp(b_name))
        });

        Ok(column_span_vec)
    }

    pub fn step(&mut self) -> Result<Step> {
        let partition = match self.queue.pop_front() {
            Some(partition) => partition,
            None => return Ok(Step::Idle),
        };

        for (column, span) in self.ranked_columns(&partition)? {
            let (lp, rp) = split(self.dataset, &partition, &column)?;

            // A split leaving one side empty makes no progress.
            if lp.is_empty() || rp.is_empty() {
                continue;
            }

            if !self
                .validity
                .is_valid(self.dataset, &lp, &self.sensitive_column)?
                || !self
                    .validity
                    .is_valid(self.dataset, &rp, &self.sensitive_column)?
            {
                continue;
            }

            debug!(
                column = column.as_str(),
                scaled_span = span,
                left = lp.len(),
                right = rp.len(),
                "split partition"
            );

            self.queue.push_back(lp);
            self.queue.push_back(rp);

            return Ok(Step::Split { column });
        }

        debug!(size = partition.len(), "finished partition");
        self.finished.push(partition);

        Ok(Step::Finished)
    }

    /// Drains the queue and returns the finished partitions.
    pub fn run(mut self) -> Result<Vec<Partition>> {
        let mut splits = 0usize;
        loop {
            match self.step()? {
                Step::Split { .. } => splits += 1,
                Step::Finished => {}
                Step::Idle => break,
            }
        }

        info!(
            splits,
            partitions = self.finished.len(),
            "partitioned dataset"
        );

        Ok(self.finished)
    }
}

/// Partitions `dataset` so every finished partition satisfies `is_valid`.
///
/// `scale` must hold an entry for every feature column; it is usually the span of the full
/// dataset.
pub fn partition_dataset<S, V>(
    dataset: &Dataset,
    feature_columns: &[S],
    sensitive_column: &str,
    scale: &Spans,
    is_valid: &V,
) -> Result<Vec<Partition>>
where
    S: AsRef<str>,
    V: Validity + ?Sized,
{
    Partitioner::new(dataset, feature_columns, sensitive_column, scale, is_valid)?.run()
}
