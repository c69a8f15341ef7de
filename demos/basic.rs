use tidynlp::{
    DocumentAnnotation, Granularity, MatrixBuilder, Pca, TableBuilder, TermKey, TokenRecord,
    Vocabulary, Weighting,
};

/// Fake backend output: one single-sentence document from a word list.
fn annotate(doc_id: &str, words: &[&str]) -> DocumentAnnotation {
    let mut ann = DocumentAnnotation::with_id(doc_id);
    let mut offset = 0;
    for (i, word) in words.iter().enumerate() {
        let last = i + 1 == words.len();
        ann.tokens.push(TokenRecord {
            sentence: 1,
            index: i as u32 + 1,
            surface: word.to_string(),
            with_ws: if last {
                word.to_string()
            } else {
                format!("{word} ")
            },
            lemma: word.to_lowercase(),
            upos: "X".to_string(),
            xpos: "X".to_string(),
            char_start: offset,
            char_end: offset + word.len(),
        });
        offset += word.len() + 1;
    }
    ann
}

fn main() {
    // ingest backend output into the tidy tables
    let mut builder = TableBuilder::new();
    builder
        .append(annotate("doc1", &["the", "cat", "sat", "on", "the", "mat"]))
        .unwrap();
    builder
        .append(annotate("doc2", &["the", "dog", "sat", "on", "the", "rug"]))
        .unwrap();
    builder
        .append(annotate("doc3", &["a", "dog", "chased", "a", "cat"]))
        .unwrap();
    let store = builder.finish();

    println!("reconstructed: {:?}", store.reconstruct_text("doc1").unwrap());

    // vocabulary under document-frequency bounds
    let tokens: Vec<_> = store.tokens().iter().collect();
    let vocab = Vocabulary::select(&tokens, TermKey::Lemma, 0.0, 1.0);
    println!("vocabulary ({} terms): {:?}", vocab.len(), vocab.terms());

    // weighted document-term matrix
    let matrix = MatrixBuilder::new()
        .granularity(Granularity::Document)
        .weighting(Weighting::TfidfSmooth)
        .build(&tokens, &vocab)
        .unwrap();
    println!(
        "matrix: {} rows x {} cols, rows = {:?}",
        matrix.nrows(),
        matrix.ncols(),
        matrix.row_labels
    );

    // project onto two principal components
    let projection = Pca::new().project_matrix(&matrix, 2).unwrap();
    for (label, row) in matrix.row_labels.iter().zip(projection.scores.rows()) {
        println!("{label}: ({:+.3}, {:+.3})", row[0], row[1]);
    }
    println!("explained variance: {:?}", projection.explained);
}
