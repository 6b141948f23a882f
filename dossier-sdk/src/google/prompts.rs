use crate::ScriptMode;
use serde_json::{json, Value};

pub fn research_prompt(subject: &str) -> String {
    format!(
        r#"Faça uma pesquisa profunda e estratégica sobre "{subject}" em PORTUGUÊS (BRASIL).

Vídeos de referência (YouTube):
1. Use a ferramenta de busca do Google para encontrar os vídeos.
2. Nunca invente links. Copie a URL exatamente como aparece nos resultados.
3. Prefira vídeos publicados nos últimos 24 meses, de canais verificados, oficiais, jornalísticos ou educacionais.
4. Formato do link: https://www.youtube.com/watch?v=...
5. Confirme que o título do vídeo corresponde ao link.

Campos do JSON:
- summary: resumo estratégico de alto impacto.
- history: contexto histórico detalhado.
- futureVision: visão de futuro para os próximos 5 a 10 anos.
- businessOpportunities: 3 planos de negócio concretos.
- globalReferences: 3 vídeos internacionais reais e ativos.
- brazilianReferences: 3 vídeos brasileiros reais e ativos.
- facts: 5 fatos curiosos e verificados."#
    )
}

pub fn script_prompt(subject: &str, mode: ScriptMode) -> String {
    match mode {
        ScriptMode::Long => format!(
            r#"Você apresenta um podcast de masterclasses imersivas.
Escreva um roteiro longo e profundo em PORTUGUÊS (BRASIL) sobre "{subject}", com no mínimo 1500 palavras, seguindo esta ordem:
1. Introdução: um gancho forte, o que é o assunto e por que ele importa hoje.
2. Evolução histórica: origens, marcos principais e como chegamos ao estado atual.
3. Cenário atual: tecnologias, tendências e desafios.
4. Oportunidades e negócios: como pessoas e empresas podem se beneficiar agora.
5. Visão de futuro (próximos 5 anos): projeções baseadas em dados.
6. Conclusão: principais aprendizados e uma mensagem inspiradora.

Regras:
- Escreva somente o texto que será falado.
- Não inclua marcações como [Música], [Narrador:], títulos de capítulos ou instruções.
- O texto deve ser fluido e natural, mantendo o ouvinte engajado do início ao fim."#
        ),
        ScriptMode::Short => format!(
            r#"Escreva um roteiro de podcast curto e direto (Pocket Podcast) sobre "{subject}" em PORTUGUÊS (BRASIL). Foque no essencial para uma compreensão rápida de 2 a 3 minutos. Escreva somente a fala do locutor."#
        ),
    }
}

fn reference_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "relevance": { "type": "STRING" },
                "videoTitle": { "type": "STRING" },
                "videoUrl": { "type": "STRING" }
            },
            "required": ["name", "relevance", "videoTitle", "videoUrl"]
        }
    })
}

pub fn research_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "history": { "type": "STRING" },
            "futureVision": { "type": "STRING" },
            "businessOpportunities": { "type": "STRING" },
            "facts": { "type": "ARRAY", "items": { "type": "STRING" } },
            "globalReferences": reference_schema(),
            "brazilianReferences": reference_schema()
        },
        "required": [
            "summary",
            "history",
            "futureVision",
            "businessOpportunities",
            "facts",
            "globalReferences",
            "brazilianReferences"
        ]
    })
}
